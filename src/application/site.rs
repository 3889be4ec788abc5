//! Collaborator traits for the remote retailer.
//!
//! Implementations drive the retailer's pages; callers only see structured
//! results or an [`AdapterFailure`].

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::comics::ComicInfo;
use crate::domain::credentials::Credentials;

/// Why the retailer could not produce what was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterFailure {
    #[error("Login failed")]
    LoginRejected,
    #[error("fetch of {url} timed out")]
    Timeout { url: String },
    #[error("{url} answered with HTTP {status}")]
    Status { status: u16, url: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("{0} not found on page")]
    MissingElement(&'static str),
    #[error("could not read page markup: {0}")]
    Markup(String),
    #[error("{0}")]
    Other(String),
}

impl AdapterFailure {
    pub fn other(reason: impl Into<String>) -> Self {
        Self::Other(reason.into())
    }

    pub fn is_login_rejected(&self) -> bool {
        matches!(self, Self::LoginRejected)
    }
}

/// Message and destination of a wishlist share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistShare {
    pub recipient: String,
    pub message: String,
}

#[async_trait]
pub trait ProductScraper: Send + Sync {
    /// Fetch one product page and extract its attributes.
    async fn scrape_product(&self, url: &str) -> Result<ComicInfo, AdapterFailure>;
}

#[async_trait]
pub trait AccountPortal: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<(), AdapterFailure>;

    /// Sign in and send the account's wishlist to `share.recipient`.
    async fn share_wishlist(
        &self,
        credentials: &Credentials,
        share: &WishlistShare,
    ) -> Result<(), AdapterFailure>;
}
