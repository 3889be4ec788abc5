//! Wishlist notifications dropped into a local directory.
//!
//! A mail delivery agent writes the HTML body of each share notification
//! into the configured directory; the file's modification time stands in for
//! the delivery time. Files delivered before the requested cut-off are not
//! read.

mod notification;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::application::mailbox::{MailboxError, WishlistMailbox};
use crate::domain::wishlist::Notification;

pub use notification::{NotificationError, parse_notification, repair_image_url};

#[derive(Debug, Clone)]
pub struct DirectoryMailbox {
    directory: PathBuf,
}

impl DirectoryMailbox {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl WishlistMailbox for DirectoryMailbox {
    async fn notifications(&self, since: SystemTime) -> Result<Vec<Notification>, MailboxError> {
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(MailboxError::Configuration(format!(
                    "mailbox directory {} does not exist",
                    self.directory.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };

        let mut notifications = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !is_notification_file(&path) {
                continue;
            }

            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let received_at = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            if received_at < since {
                continue;
            }

            let body = match tokio::fs::read(&path).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(err) => {
                    warn!(
                        target = "comicshelf::mailbox",
                        path = %path.display(),
                        error = %err,
                        "skipping unreadable notification"
                    );
                    continue;
                }
            };

            match parse_notification(&body) {
                Ok(wishlist) => notifications.push(Notification {
                    received_at,
                    wishlist,
                }),
                Err(err) => warn!(
                    target = "comicshelf::mailbox",
                    path = %path.display(),
                    error = %err,
                    "skipping notification that could not be parsed"
                ),
            }
        }

        notifications.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        debug!(
            target = "comicshelf::mailbox",
            count = notifications.len(),
            "mailbox scanned"
        );
        Ok(notifications)
    }
}

fn is_notification_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}
