pub mod error;
pub mod handlers;
pub mod state;

pub use state::ApiState;

use std::any::Any;

use axum::{
    Router, middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use crate::infra::http::middleware::{log_responses, set_request_context};

use error::ApiError;

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/test_account", post(handlers::test_account))
        .route("/send_wishlist", post(handlers::send_wishlist))
        .route("/get_wishlist", post(handlers::get_wishlist))
        .route(
            "/get_wishlist_complete",
            post(handlers::get_wishlist_complete),
        )
        .route(
            "/get_comic_information",
            post(handlers::comic_information),
        )
        .route(
            "/get_comic_information_api",
            get(handlers::comic_information_query).post(handlers::comic_information_query),
        )
        .route(
            "/get_comic_information/{*url}",
            get(handlers::comic_information_path).post(handlers::comic_information_path),
        )
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
        .layer(CorsLayer::permissive())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::internal("infra::http::api::panic", "Internal server error")
        .with_detail(detail)
        .into_response()
}
