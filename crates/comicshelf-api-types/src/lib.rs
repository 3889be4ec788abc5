//! Wire types for the comicshelf HTTP API.
//!
//! Credentials travel encoded; the server decodes them with its configured
//! codec before they reach the retailer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Body of `/test_account`, `/send_wishlist` and `/get_wishlist_complete`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `/get_wishlist`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WishlistRequest {
    #[serde(default)]
    pub email: Option<String>,
}

/// Body or query of the comic information routes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ComicInformationRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Successful comic lookup. `result` always carries `price` and `url`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ComicInformationResponse {
    pub message: String,
    pub result: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WishlistItemView {
    pub name: String,
    pub link: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WishlistView {
    pub message: String,
    pub data: Vec<WishlistItemView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WishlistResponse {
    pub message: String,
    pub result: WishlistView,
}
