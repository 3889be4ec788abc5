use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, RawQuery, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use comicshelf_api_types::{
    ComicInformationRequest, ComicInformationResponse, CredentialsRequest, MessageResponse,
    WishlistItemView, WishlistRequest, WishlistResponse, WishlistView,
};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::domain::credentials::Credentials;
use crate::domain::wishlist::Wishlist;

use super::error::ApiError;
use super::state::ApiState;

const SOURCE_ACCOUNTS: &str = "infra::http::api::accounts";
const SOURCE_WISHLIST: &str = "infra::http::api::wishlist";
const SOURCE_COMICS: &str = "infra::http::api::comics";

pub const LOGIN_SUCCESSFUL: &str = "Login successful";
pub const WISHLIST_SENT: &str = "Wishlist sent successfully";
pub const WISHLIST_FOUND: &str = "Got wishlist successfully";
pub const COMIC_FOUND: &str = "Got comic information successfully";

const CREDENTIALS_REQUIRED: &str = "Email and password are required";
const EMAIL_REQUIRED: &str = "Email is required";
const INVALID_QUERY: &str = "Query string could not be read";
const INVALID_PATH: &str = "Product URL in the path could not be read";

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn healthz() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn test_account(State(state): State<ApiState>, body: Bytes) -> ApiResult<MessageResponse> {
    let request: CredentialsRequest = json_body(SOURCE_ACCOUNTS, &body)?;
    let credentials = decode_credentials(&state, SOURCE_ACCOUNTS, request)?;

    state
        .accounts
        .verify_login(&credentials)
        .await
        .map_err(|err| ApiError::from_account(SOURCE_ACCOUNTS, err))?;

    Ok(message(LOGIN_SUCCESSFUL))
}

pub async fn send_wishlist(State(state): State<ApiState>, body: Bytes) -> ApiResult<MessageResponse> {
    let request: CredentialsRequest = json_body(SOURCE_WISHLIST, &body)?;
    let credentials = decode_credentials(&state, SOURCE_WISHLIST, request)?;

    state
        .accounts
        .send_wishlist(&credentials)
        .await
        .map_err(|err| ApiError::from_account(SOURCE_WISHLIST, err))?;

    Ok(message(WISHLIST_SENT))
}

pub async fn get_wishlist(State(state): State<ApiState>, body: Bytes) -> ApiResult<WishlistResponse> {
    let request: WishlistRequest = json_body(SOURCE_WISHLIST, &body)?;
    let encoded = present(request.email)
        .ok_or_else(|| ApiError::bad_request(SOURCE_WISHLIST, EMAIL_REQUIRED))?;
    let email = state
        .credentials
        .decode(&encoded)
        .map_err(|err| ApiError::from_credentials(SOURCE_WISHLIST, err))?;
    if email.trim().is_empty() {
        return Err(ApiError::bad_request(SOURCE_WISHLIST, EMAIL_REQUIRED));
    }

    let wishlist = state
        .accounts
        .find_wishlist(email.trim())
        .await
        .map_err(|err| ApiError::from_account(SOURCE_WISHLIST, err))?;

    Ok(wishlist_response(wishlist))
}

pub async fn get_wishlist_complete(
    State(state): State<ApiState>,
    body: Bytes,
) -> ApiResult<WishlistResponse> {
    let request: CredentialsRequest = json_body(SOURCE_WISHLIST, &body)?;
    let credentials = decode_credentials(&state, SOURCE_WISHLIST, request)?;

    let wishlist = state
        .accounts
        .fetch_wishlist(&credentials)
        .await
        .map_err(|err| ApiError::from_account(SOURCE_WISHLIST, err))?;

    info!(
        target = "comicshelf::http::api",
        items = wishlist.items.len(),
        "wishlist relayed"
    );
    Ok(wishlist_response(wishlist))
}

/// `POST /get_comic_information` with `{"url": ...}`.
pub async fn comic_information(
    State(state): State<ApiState>,
    body: Bytes,
) -> ApiResult<ComicInformationResponse> {
    let request: ComicInformationRequest = json_body(SOURCE_COMICS, &body)?;
    lookup_comic(&state, request.url).await
}

/// `GET|POST /get_comic_information_api?url=...`; a JSON body is accepted
/// when the query carries no URL.
pub async fn comic_information_query(
    State(state): State<ApiState>,
    query: Result<Query<ComicInformationRequest>, QueryRejection>,
    body: Bytes,
) -> ApiResult<ComicInformationResponse> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::bad_request(SOURCE_COMICS, INVALID_QUERY).with_detail(rejection.body_text())
    })?;
    let url = match present(query.url) {
        Some(url) => Some(url),
        None => json_body::<ComicInformationRequest>(SOURCE_COMICS, &body)?.url,
    };
    lookup_comic(&state, url).await
}

/// `GET|POST /get_comic_information/{*url}` with the product URL as the path.
pub async fn comic_information_path(
    State(state): State<ApiState>,
    url: Result<Path<String>, PathRejection>,
    RawQuery(query): RawQuery,
) -> ApiResult<ComicInformationResponse> {
    let Path(url) = url.map_err(|rejection| {
        ApiError::bad_request(SOURCE_COMICS, INVALID_PATH).with_detail(rejection.body_text())
    })?;
    let mut url = repair_collapsed_scheme(&url);
    if let Some(query) = query.filter(|query| !query.is_empty()) {
        url.push('?');
        url.push_str(&query);
    }
    lookup_comic(&state, Some(url)).await
}

async fn lookup_comic(state: &ApiState, url: Option<String>) -> ApiResult<ComicInformationResponse> {
    let url = present(url).ok_or_else(|| ApiError::url_required(SOURCE_COMICS))?;

    let info = state
        .comics
        .get_comic_info(&url)
        .await
        .map_err(|failure| ApiError::from_adapter(SOURCE_COMICS, failure))?;

    Ok(Json(ComicInformationResponse {
        message: COMIC_FOUND.to_string(),
        result: info.into_attributes(),
    }))
}

fn decode_credentials(
    state: &ApiState,
    source: &'static str,
    request: CredentialsRequest,
) -> Result<Credentials, ApiError> {
    let (Some(email), Some(password)) = (present(request.email), present(request.password)) else {
        return Err(ApiError::bad_request(source, CREDENTIALS_REQUIRED));
    };

    let email = state
        .credentials
        .decode(&email)
        .map_err(|err| ApiError::from_credentials(source, err))?;
    let password = state
        .credentials
        .decode(&password)
        .map_err(|err| ApiError::from_credentials(source, err))?;

    Credentials::new(email.trim(), password).map_err(|err| ApiError::from_domain(source, err))
}

/// Parse an optional JSON body; an empty body yields the default request.
fn json_body<T>(source: &'static str, body: &Bytes) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        ApiError::bad_request(source, "Request body must be a JSON object").with_detail(err.to_string())
    })
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Restore `scheme://` when a proxy has merged the double slash of a URL
/// passed as a path.
pub fn repair_collapsed_scheme(raw: &str) -> String {
    let raw = raw.trim_start_matches('/');
    for scheme in ["https:", "http:"] {
        if let Some(rest) = raw.strip_prefix(scheme)
            && !rest.starts_with("//")
        {
            return format!("{scheme}//{}", rest.trim_start_matches('/'));
        }
    }
    raw.to_string()
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

fn wishlist_response(wishlist: Wishlist) -> Json<WishlistResponse> {
    Json(WishlistResponse {
        message: WISHLIST_FOUND.to_string(),
        result: WishlistView {
            message: wishlist.message,
            data: wishlist
                .items
                .into_iter()
                .map(|item| WishlistItemView {
                    name: item.name,
                    link: item.link,
                    image: item.image,
                })
                .collect(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repairs_collapsed_scheme_slashes() {
        assert_eq!(
            repair_collapsed_scheme("https:/shop.example.com/comic"),
            "https://shop.example.com/comic"
        );
        assert_eq!(
            repair_collapsed_scheme("http:shop.example.com"),
            "http://shop.example.com"
        );
        assert_eq!(
            repair_collapsed_scheme("https://shop.example.com/comic"),
            "https://shop.example.com/comic"
        );
        assert_eq!(
            repair_collapsed_scheme("shop.example.com/comic"),
            "shop.example.com/comic"
        );
    }

    #[test]
    fn empty_bodies_parse_as_defaults() {
        let request: ComicInformationRequest =
            json_body("tests", &Bytes::from_static(b"  ")).expect("empty body accepted");
        assert!(request.url.is_none());

        assert!(json_body::<ComicInformationRequest>("tests", &Bytes::from_static(b"{")).is_err());
    }
}
