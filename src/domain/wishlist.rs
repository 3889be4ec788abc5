use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// One product listed in a shared wishlist notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub name: String,
    pub link: String,
    pub image: String,
}

/// A wishlist as relayed by the retailer's share notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Wishlist {
    /// Free-text message the sender attached to the share.
    pub message: String,
    pub items: Vec<WishlistItem>,
}

impl Wishlist {
    /// Whether the share message names `email` (case-insensitive).
    pub fn mentions(&self, email: &str) -> bool {
        let needle = email.trim().to_lowercase();
        !needle.is_empty() && self.message.to_lowercase().contains(&needle)
    }
}

/// A parsed share notification together with the time it reached the mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub received_at: SystemTime,
    pub wishlist: Wishlist,
}
