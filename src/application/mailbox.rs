use std::time::SystemTime;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::wishlist::Notification;

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("mailbox unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("mailbox misconfigured: {0}")]
    Configuration(String),
}

/// Source of wishlist share notifications.
#[async_trait]
pub trait WishlistMailbox: Send + Sync {
    /// Readable notifications received at or after `since`, newest first.
    async fn notifications(&self, since: SystemTime) -> Result<Vec<Notification>, MailboxError>;
}
