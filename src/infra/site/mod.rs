//! Retailer adapter over plain HTTP.
//!
//! Product pages are fetched with a shared client. Account actions run in a
//! fresh cookie session per call so that concurrent users never share a
//! login.

mod forms;
mod product;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::application::site::{AccountPortal, AdapterFailure, ProductScraper, WishlistShare};
use crate::config::SiteSettings;
use crate::domain::comics::ComicInfo;
use crate::domain::credentials::Credentials;
use crate::infra::error::InfraError;

pub use forms::form_key;
pub use product::parse_product;

const LOGIN_PATH: &str = "customer/account/login/";
const LOGIN_POST_PATH: &str = "customer/account/loginPost/";

#[derive(Debug, Clone)]
struct Endpoints {
    login: Url,
    login_post: Url,
    share: Url,
    send: Url,
}

impl Endpoints {
    fn new(base: &Url, wishlist_id: Option<&str>) -> Result<Self, url::ParseError> {
        let scope = wishlist_id
            .map(|id| format!("wishlist_id/{id}/"))
            .unwrap_or_default();
        Ok(Self {
            login: base.join(LOGIN_PATH)?,
            login_post: base.join(LOGIN_POST_PATH)?,
            share: base.join(&format!("wishlist/index/share/{scope}"))?,
            send: base.join(&format!("wishlist/index/send/{scope}"))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct HttpSiteAdapter {
    client: Client,
    endpoints: Endpoints,
    timeout: Duration,
    user_agent: String,
    login_success_marker: String,
}

impl HttpSiteAdapter {
    pub fn new(settings: &SiteSettings) -> Result<Self, InfraError> {
        let endpoints = Endpoints::new(&settings.base_url, settings.wishlist_id.as_deref())
            .map_err(|err| {
                InfraError::configuration(format!("site endpoints could not be derived: {err}"))
            })?;
        let client = build_client(settings.request_timeout, &settings.user_agent, false)
            .map_err(|err| InfraError::HttpClient(err.to_string()))?;

        Ok(Self {
            client,
            endpoints,
            timeout: settings.request_timeout,
            user_agent: settings.user_agent.clone(),
            login_success_marker: settings.login_success_marker.clone(),
        })
    }

    fn session(&self) -> Result<Client, AdapterFailure> {
        build_client(self.timeout, &self.user_agent, true)
            .map_err(|err| AdapterFailure::Transport(err.to_string()))
    }

    /// Sign in on `session`, leaving its cookie jar authenticated.
    async fn sign_in(&self, session: &Client, credentials: &Credentials) -> Result<(), AdapterFailure> {
        let login_page = get_page(session, &self.endpoints.login).await?;
        let form_key = form_key(&login_page.body)?;

        let response = session
            .post(self.endpoints.login_post.clone())
            .form(&[
                ("form_key", form_key.as_str()),
                ("login[username]", credentials.email()),
                ("login[password]", credentials.password()),
                ("send", ""),
            ])
            .send()
            .await
            .map_err(|err| request_failure(err, self.endpoints.login_post.as_str()))?;
        let landing = read_page(response).await?;

        let still_on_login = landing.url.path().contains(LOGIN_PATH.trim_end_matches('/'));
        if still_on_login || !landing.body.contains(&self.login_success_marker) {
            debug!(
                target = "comicshelf::site",
                landing = %landing.url,
                "login did not reach the account page"
            );
            return Err(AdapterFailure::LoginRejected);
        }
        Ok(())
    }
}

#[async_trait]
impl ProductScraper for HttpSiteAdapter {
    #[instrument(skip(self), fields(url = %url))]
    async fn scrape_product(&self, url: &str) -> Result<ComicInfo, AdapterFailure> {
        let target = Url::parse(url)
            .map_err(|err| AdapterFailure::other(format!("invalid URL {url}: {err}")))?;
        let page = get_page(&self.client, &target).await?;
        let info = parse_product(&page.body, url)?;
        debug!(
            target = "comicshelf::site",
            attributes = info.len(),
            "product page scraped"
        );
        Ok(info)
    }
}

#[async_trait]
impl AccountPortal for HttpSiteAdapter {
    #[instrument(skip_all)]
    async fn login(&self, credentials: &Credentials) -> Result<(), AdapterFailure> {
        let session = self.session()?;
        self.sign_in(&session, credentials).await
    }

    #[instrument(skip_all, fields(recipient = %share.recipient))]
    async fn share_wishlist(
        &self,
        credentials: &Credentials,
        share: &WishlistShare,
    ) -> Result<(), AdapterFailure> {
        let session = self.session()?;
        self.sign_in(&session, credentials).await?;

        let share_page = get_page(&session, &self.endpoints.share).await?;
        let form_key = form_key(&share_page.body)?;

        let response = session
            .post(self.endpoints.send.clone())
            .form(&[
                ("form_key", form_key.as_str()),
                ("emails", share.recipient.as_str()),
                ("message", share.message.as_str()),
            ])
            .send()
            .await
            .map_err(|err| request_failure(err, self.endpoints.send.as_str()))?;
        let confirmation = read_page(response).await?;

        if confirmation.url.path().contains(LOGIN_PATH.trim_end_matches('/')) {
            warn!(
                target = "comicshelf::site",
                "session expired before the wishlist was sent"
            );
            return Err(AdapterFailure::LoginRejected);
        }

        info!(target = "comicshelf::site", "wishlist share submitted");
        Ok(())
    }
}

struct Page {
    url: Url,
    body: String,
}

fn build_client(timeout: Duration, user_agent: &str, cookies: bool) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .cookie_store(cookies)
        .build()
}

async fn get_page(client: &Client, url: &Url) -> Result<Page, AdapterFailure> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|err| request_failure(err, url.as_str()))?;
    read_page(response).await
}

async fn read_page(response: Response) -> Result<Page, AdapterFailure> {
    let url = response.url().clone();
    let status = response.status();
    if !status.is_success() {
        return Err(AdapterFailure::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = response
        .text()
        .await
        .map_err(|err| request_failure(err, url.as_str()))?;
    Ok(Page { url, body })
}

fn request_failure(err: reqwest::Error, url: &str) -> AdapterFailure {
    if err.is_timeout() {
        AdapterFailure::Timeout {
            url: url.to_string(),
        }
    } else {
        AdapterFailure::Transport(err.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hang_off_the_store_base() {
        let base = Url::parse("https://shop.example.com/store_de/").expect("valid url");
        let endpoints = Endpoints::new(&base, Some("42")).expect("endpoints");

        assert_eq!(
            endpoints.login.as_str(),
            "https://shop.example.com/store_de/customer/account/login/"
        );
        assert_eq!(
            endpoints.login_post.as_str(),
            "https://shop.example.com/store_de/customer/account/loginPost/"
        );
        assert_eq!(
            endpoints.share.as_str(),
            "https://shop.example.com/store_de/wishlist/index/share/wishlist_id/42/"
        );
        assert_eq!(
            endpoints.send.as_str(),
            "https://shop.example.com/store_de/wishlist/index/send/wishlist_id/42/"
        );
    }

    #[test]
    fn endpoints_default_to_the_account_wishlist() {
        let base = Url::parse("https://shop.example.com/").expect("valid url");
        let endpoints = Endpoints::new(&base, None).expect("endpoints");

        assert_eq!(
            endpoints.share.as_str(),
            "https://shop.example.com/wishlist/index/share/"
        );
        assert_eq!(
            endpoints.send.as_str(),
            "https://shop.example.com/wishlist/index/send/"
        );
    }

    #[tokio::test]
    async fn unreachable_hosts_surface_as_adapter_failures() {
        let settings = SiteSettings {
            base_url: Url::parse("http://127.0.0.1:9/").expect("valid url"),
            wishlist_id: None,
            share_recipient: Some("inbox@example.com".to_string()),
            request_timeout: Duration::from_millis(500),
            user_agent: "comicshelf-test".to_string(),
            login_success_marker: "Welcome".to_string(),
        };
        let adapter = HttpSiteAdapter::new(&settings).expect("adapter");

        let err = adapter
            .scrape_product("http://127.0.0.1:9/comic")
            .await
            .expect_err("nothing listens on the discard port");
        assert!(matches!(
            err,
            AdapterFailure::Transport(_) | AdapterFailure::Timeout { .. }
        ));
    }

    #[tokio::test]
    async fn malformed_urls_are_rejected_before_any_request() {
        let settings = SiteSettings {
            base_url: Url::parse("https://shop.example.com/").expect("valid url"),
            wishlist_id: None,
            share_recipient: Some("inbox@example.com".to_string()),
            request_timeout: Duration::from_secs(1),
            user_agent: "comicshelf-test".to_string(),
            login_success_marker: "Welcome".to_string(),
        };
        let adapter = HttpSiteAdapter::new(&settings).expect("adapter");

        let err = adapter.scrape_product("not a url").await.expect_err("invalid");
        assert!(err.to_string().starts_with("invalid URL not a url"));
    }
}
