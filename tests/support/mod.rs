//! Collaborator stubs shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;

use comicshelf::application::accounts::{AccountService, WishlistRelaySettings};
use comicshelf::application::mailbox::{MailboxError, WishlistMailbox};
use comicshelf::application::site::{
    AccountPortal, AdapterFailure, ProductScraper, WishlistShare,
};
use comicshelf::domain::comics::ComicInfo;
use comicshelf::domain::credentials::Credentials;
use comicshelf::domain::wishlist::{Notification, Wishlist, WishlistItem};
use comicshelf::infra::credentials::{CredentialCodec, CredentialEncoding};

pub const SECRET_KEY: &str = "0123456789abcdef0123456789abcdef";
pub const SECRET_BUFFER: &str = "fedcba9876543210";
pub const EMAIL: &str = "reader@example.com";
pub const PASSWORD: &str = "hunter2";
pub const RECIPIENT: &str = "inbox@example.com";

pub fn codec() -> CredentialCodec {
    CredentialCodec::new(SECRET_KEY, SECRET_BUFFER, CredentialEncoding::Hex)
        .expect("test key material is valid")
}

enum Script {
    Echo(String),
    Fixed(Result<ComicInfo, AdapterFailure>),
    Panic,
}

/// Product scraper whose answer can be changed between calls.
pub struct ScriptedScraper {
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
    script: Mutex<Script>,
}

impl ScriptedScraper {
    /// Answer every URL with `ComicInfo::new(price, url)`.
    pub fn echo(price: &str) -> Arc<Self> {
        Arc::new(Self::with_script(Script::Echo(price.to_string())))
    }

    pub fn fixed(result: Result<ComicInfo, AdapterFailure>) -> Arc<Self> {
        Arc::new(Self::with_script(Script::Fixed(result)))
    }

    pub fn panicking() -> Arc<Self> {
        Arc::new(Self::with_script(Script::Panic))
    }

    fn with_script(script: Script) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
            script: Mutex::new(script),
        }
    }

    pub fn respond_with(&self, result: Result<ComicInfo, AdapterFailure>) {
        *self.script.lock().unwrap() = Script::Fixed(result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductScraper for ScriptedScraper {
    async fn scrape_product(&self, url: &str) -> Result<ComicInfo, AdapterFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        let outcome = match &*self.script.lock().unwrap() {
            Script::Echo(price) => Some(Ok(ComicInfo::new(price.clone(), url))),
            Script::Fixed(result) => Some(result.clone()),
            Script::Panic => None,
        };
        match outcome {
            Some(result) => result,
            None => panic!("scraper exploded"),
        }
    }
}

/// In-memory mailbox.
#[derive(Default)]
pub struct MemoryMailbox {
    notifications: Mutex<Vec<Notification>>,
}

impl MemoryMailbox {
    pub fn deliver(&self, wishlist: Wishlist) {
        self.notifications.lock().unwrap().insert(
            0,
            Notification {
                received_at: SystemTime::now(),
                wishlist,
            },
        );
    }
}

#[async_trait]
impl WishlistMailbox for MemoryMailbox {
    async fn notifications(&self, since: SystemTime) -> Result<Vec<Notification>, MailboxError> {
        let notifications = self.notifications.lock().unwrap();
        Ok(notifications
            .iter()
            .filter(|notification| notification.received_at >= since)
            .cloned()
            .collect())
    }
}

pub fn sample_wishlist(email: &str) -> Wishlist {
    Wishlist {
        message: format!("WISHLIST FROM {email}"),
        items: vec![WishlistItem {
            name: "Saga Vol. 1".to_string(),
            link: "https://shop.example.com/saga-1".to_string(),
            image: "https://cdn.example.com/saga.jpg".to_string(),
        }],
    }
}

/// Accepts exactly one account; shares land in the attached mailbox.
pub struct FakePortal {
    mailbox: Arc<MemoryMailbox>,
    shares: Mutex<Vec<WishlistShare>>,
}

impl FakePortal {
    pub fn new(mailbox: Arc<MemoryMailbox>) -> Arc<Self> {
        Arc::new(Self {
            mailbox,
            shares: Mutex::new(Vec::new()),
        })
    }

    pub fn shares(&self) -> Vec<WishlistShare> {
        self.shares.lock().unwrap().clone()
    }

    fn check(credentials: &Credentials) -> Result<(), AdapterFailure> {
        if credentials.email() == EMAIL && credentials.password() == PASSWORD {
            Ok(())
        } else {
            Err(AdapterFailure::LoginRejected)
        }
    }
}

#[async_trait]
impl AccountPortal for FakePortal {
    async fn login(&self, credentials: &Credentials) -> Result<(), AdapterFailure> {
        Self::check(credentials)
    }

    async fn share_wishlist(
        &self,
        credentials: &Credentials,
        share: &WishlistShare,
    ) -> Result<(), AdapterFailure> {
        Self::check(credentials)?;
        self.shares.lock().unwrap().push(share.clone());
        self.mailbox.deliver(sample_wishlist(credentials.email()));
        Ok(())
    }
}

pub fn account_service(portal: Arc<FakePortal>, mailbox: Arc<MemoryMailbox>) -> AccountService {
    AccountService::new(
        portal,
        mailbox,
        WishlistRelaySettings {
            recipient: RECIPIENT.to_string(),
            poll_attempts: std::num::NonZeroU32::new(3).expect("non-zero"),
            poll_interval: Duration::from_millis(10),
        },
    )
}
