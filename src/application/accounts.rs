//! Account workflows: login checks and wishlist relaying.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::domain::credentials::Credentials;
use crate::domain::wishlist::{Notification, Wishlist};

use super::mailbox::{MailboxError, WishlistMailbox};
use super::site::{AccountPortal, AdapterFailure, WishlistShare};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Adapter(#[from] AdapterFailure),
    #[error(transparent)]
    Mailbox(#[from] MailboxError),
    #[error("no wishlist notification found for {email}")]
    NotFound { email: String },
}

/// Where shares are sent and how long to wait for them to arrive.
#[derive(Debug, Clone)]
pub struct WishlistRelaySettings {
    pub recipient: String,
    pub poll_attempts: NonZeroU32,
    pub poll_interval: Duration,
}

pub struct AccountService {
    portal: Arc<dyn AccountPortal>,
    mailbox: Arc<dyn WishlistMailbox>,
    settings: WishlistRelaySettings,
}

impl AccountService {
    pub fn new(
        portal: Arc<dyn AccountPortal>,
        mailbox: Arc<dyn WishlistMailbox>,
        settings: WishlistRelaySettings,
    ) -> Self {
        Self {
            portal,
            mailbox,
            settings,
        }
    }

    #[instrument(skip_all, fields(email = credentials.email()))]
    pub async fn verify_login(&self, credentials: &Credentials) -> Result<(), AccountError> {
        self.portal.login(credentials).await?;
        info!(target = "comicshelf::accounts", "login verified");
        Ok(())
    }

    #[instrument(skip_all, fields(email = credentials.email()))]
    pub async fn send_wishlist(&self, credentials: &Credentials) -> Result<(), AccountError> {
        let share = WishlistShare {
            recipient: self.settings.recipient.clone(),
            message: share_message(credentials.email()),
        };
        self.portal.share_wishlist(credentials, &share).await?;
        info!(
            target = "comicshelf::accounts",
            recipient = %share.recipient,
            "wishlist shared"
        );
        Ok(())
    }

    /// Most recent wishlist shared by `email`.
    pub async fn find_wishlist(&self, email: &str) -> Result<Wishlist, AccountError> {
        self.latest_since(email, SystemTime::UNIX_EPOCH)
            .await?
            .ok_or_else(|| AccountError::NotFound {
                email: email.to_string(),
            })
    }

    /// Share the wishlist, then wait for the notification it produces.
    #[instrument(skip_all, fields(email = credentials.email()))]
    pub async fn fetch_wishlist(&self, credentials: &Credentials) -> Result<Wishlist, AccountError> {
        let started_at = SystemTime::now();
        self.send_wishlist(credentials).await?;

        let attempts = self.settings.poll_attempts.get();
        for attempt in 1..=attempts {
            if let Some(wishlist) = self.latest_since(credentials.email(), started_at).await? {
                return Ok(wishlist);
            }
            debug!(
                target = "comicshelf::accounts",
                attempt, attempts, "wishlist notification not delivered yet"
            );
            if attempt < attempts {
                tokio::time::sleep(self.settings.poll_interval).await;
            }
        }

        Err(AccountError::NotFound {
            email: credentials.email().to_string(),
        })
    }

    async fn latest_since(
        &self,
        email: &str,
        since: SystemTime,
    ) -> Result<Option<Wishlist>, AccountError> {
        let notifications = self.mailbox.notifications(since).await?;
        Ok(newest_matching(notifications, email, since))
    }
}

fn share_message(email: &str) -> String {
    format!("WISHLIST FROM {email}")
}

fn newest_matching(
    notifications: Vec<Notification>,
    email: &str,
    since: SystemTime,
) -> Option<Wishlist> {
    notifications
        .into_iter()
        .filter(|notification| notification.received_at >= since)
        .filter(|notification| notification.wishlist.mentions(email))
        .max_by_key(|notification| notification.received_at)
        .map(|notification| notification.wishlist)
}
