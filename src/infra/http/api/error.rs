use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use comicshelf_api_types::{ErrorResponse, MessageResponse};

use crate::application::accounts::AccountError;
use crate::application::error::ErrorReport;
use crate::application::site::AdapterFailure;
use crate::domain::error::DomainError;
use crate::infra::credentials::CredentialError;

pub const URL_REQUIRED: &str = "URL is required";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Body {
    Error(String),
    Message(String),
}

/// Error response of the JSON API.
///
/// Most failures render as `{"error": ...}`; a rejected login renders as
/// `{"message": "Login failed"}` to match the success shape of the account
/// routes.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    source: &'static str,
    body: Body,
    detail: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, source: &'static str, body: Body) -> Self {
        Self {
            status,
            source,
            body,
            detail: None,
        }
    }

    pub fn bad_request(source: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, source, Body::Error(message.into()))
    }

    pub fn not_found(source: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, source, Body::Error(message.into()))
    }

    pub fn internal(source: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            source,
            Body::Error(message.into()),
        )
    }

    pub fn login_failed(source: &'static str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            source,
            Body::Message(AdapterFailure::LoginRejected.to_string()),
        )
    }

    pub fn url_required(source: &'static str) -> Self {
        Self::bad_request(source, URL_REQUIRED)
    }

    /// Extra diagnostic for the logs that is not sent to the client.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn from_adapter(source: &'static str, failure: AdapterFailure) -> Self {
        if failure.is_login_rejected() {
            return Self::login_failed(source);
        }
        Self::bad_request(source, failure.to_string())
    }

    pub fn from_account(source: &'static str, err: AccountError) -> Self {
        match err {
            AccountError::Adapter(failure) => Self::from_adapter(source, failure),
            AccountError::NotFound { .. } => Self::not_found(source, err.to_string()),
            AccountError::Mailbox(inner) => {
                Self::internal(source, "Wishlist mailbox unavailable").with_detail(inner.to_string())
            }
        }
    }

    pub fn from_credentials(source: &'static str, err: CredentialError) -> Self {
        Self::bad_request(source, "Credentials could not be decoded").with_detail(err.to_string())
    }

    pub fn from_domain(source: &'static str, err: DomainError) -> Self {
        Self::bad_request(source, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (mut response, message) = match self.body {
            Body::Error(error) => (
                (self.status, Json(ErrorResponse { error: error.clone() })).into_response(),
                error,
            ),
            Body::Message(message) => (
                (
                    self.status,
                    Json(MessageResponse {
                        message: message.clone(),
                    }),
                )
                    .into_response(),
                message,
            ),
        };

        let mut report = ErrorReport::from_message(self.source, self.status, message);
        if let Some(detail) = self.detail {
            report.messages.push(detail);
        }
        report.attach(&mut response);
        response
    }
}
