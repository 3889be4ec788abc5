//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

pub use cli::{CliArgs, CodecArgs, Command, ScrapeArgs, ServeArgs, ServeOverrides};

use std::{
    fmt,
    net::SocketAddr,
    num::{NonZeroU32, NonZeroUsize},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::infra::credentials::CredentialEncoding;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "comicshelf";
const ENV_PREFIX: &str = "COMICSHELF";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_SITE_BASE_URL: &str = "https://www.panini.de/shp_deu_de/";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = concat!("comicshelf/", env!("CARGO_PKG_VERSION"));
const DEFAULT_LOGIN_SUCCESS_MARKER: &str = "Welcome";
const DEFAULT_MAILBOX_DIR: &str = "mailbox";
const DEFAULT_POLL_ATTEMPTS: u64 = 12;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_CACHE_MEMO_CAPACITY: u64 = 100;
const SECRET_KEY_LEN: usize = 32;
const SECRET_BUFFER_LEN: usize = 16;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub credentials: CredentialSettings,
    pub site: SiteSettings,
    pub mailbox: MailboxSettings,
    pub wishlist: WishlistSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Key material shared with the web client. Absent until configured.
#[derive(Clone)]
pub struct CredentialSettings {
    pub secret_key: Option<String>,
    pub secret_buffer: Option<String>,
    pub encoding: CredentialEncoding,
}

impl fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSettings")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field(
                "secret_buffer",
                &self.secret_buffer.as_ref().map(|_| "<redacted>"),
            )
            .field("encoding", &self.encoding)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    /// Store root; always ends with `/` so endpoints can be joined onto it.
    pub base_url: Url,
    /// Explicit wishlist to share; the account's default when absent.
    pub wishlist_id: Option<String>,
    pub share_recipient: Option<String>,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub login_success_marker: String,
}

#[derive(Debug, Clone)]
pub struct MailboxSettings {
    pub directory: PathBuf,
}

#[derive(Debug, Clone)]
pub struct WishlistSettings {
    pub poll_attempts: NonZeroU32,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub memo_capacity: NonZeroUsize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Encrypt(_) | Command::Decrypt(_) | Command::Scrape(_)) => {}
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    credentials: RawCredentialSettings,
    site: RawSiteSettings,
    mailbox: RawMailboxSettings,
    wishlist: RawWishlistSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.site_base_url.as_ref() {
            self.site.base_url = Some(url.clone());
        }
        if let Some(recipient) = overrides.site_share_recipient.as_ref() {
            self.site.share_recipient = Some(recipient.clone());
        }
        if let Some(directory) = overrides.mailbox_directory.as_ref() {
            self.mailbox.directory = Some(directory.clone());
        }
        if let Some(ttl) = overrides.cache_ttl_seconds {
            self.cache.ttl_seconds = Some(ttl);
        }
        if let Some(capacity) = overrides.cache_memo_capacity {
            self.cache.memo_capacity = Some(capacity);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            credentials,
            site,
            mailbox,
            wishlist,
            cache,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            credentials: build_credential_settings(credentials)?,
            site: build_site_settings(site)?,
            mailbox: build_mailbox_settings(mailbox)?,
            wishlist: build_wishlist_settings(wishlist)?,
            cache: build_cache_settings(cache)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_credential_settings(
    credentials: RawCredentialSettings,
) -> Result<CredentialSettings, LoadError> {
    let secret_key = credentials.secret_key.filter(|key| !key.is_empty());
    if let Some(key) = secret_key.as_ref()
        && key.len() != SECRET_KEY_LEN
    {
        return Err(LoadError::invalid(
            "credentials.secret_key",
            format!("must be exactly {SECRET_KEY_LEN} bytes"),
        ));
    }

    let secret_buffer = credentials
        .secret_buffer
        .filter(|buffer| !buffer.is_empty());
    if let Some(buffer) = secret_buffer.as_ref()
        && buffer.len() != SECRET_BUFFER_LEN
    {
        return Err(LoadError::invalid(
            "credentials.secret_buffer",
            format!("must be exactly {SECRET_BUFFER_LEN} bytes"),
        ));
    }

    let encoding = match credentials.encoding {
        Some(value) => CredentialEncoding::from_str(&value)
            .map_err(|reason| LoadError::invalid("credentials.encoding", reason))?,
        None => CredentialEncoding::default(),
    };

    Ok(CredentialSettings {
        secret_key,
        secret_buffer,
        encoding,
    })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let mut base = site
        .base_url
        .unwrap_or_else(|| DEFAULT_SITE_BASE_URL.to_string());
    if !base.ends_with('/') {
        base.push('/');
    }
    let base_url = Url::parse(&base)
        .map_err(|err| LoadError::invalid("site.base_url", format!("invalid URL: {err}")))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "site.base_url",
            "scheme must be http or https",
        ));
    }

    let timeout_secs = site
        .request_timeout_seconds
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "site.request_timeout_seconds",
            "must be greater than zero",
        ));
    }

    let share_recipient = non_empty(site.share_recipient);
    if let Some(recipient) = share_recipient.as_ref()
        && !recipient.contains('@')
    {
        return Err(LoadError::invalid(
            "site.share_recipient",
            "must be an email address",
        ));
    }

    Ok(SiteSettings {
        base_url,
        wishlist_id: non_empty(site.wishlist_id),
        share_recipient,
        request_timeout: Duration::from_secs(timeout_secs),
        user_agent: non_empty(site.user_agent).unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        login_success_marker: non_empty(site.login_success_marker)
            .unwrap_or_else(|| DEFAULT_LOGIN_SUCCESS_MARKER.to_string()),
    })
}

fn build_mailbox_settings(mailbox: RawMailboxSettings) -> Result<MailboxSettings, LoadError> {
    let directory = mailbox
        .directory
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MAILBOX_DIR));
    if directory.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "mailbox.directory",
            "path must not be empty",
        ));
    }
    Ok(MailboxSettings { directory })
}

fn build_wishlist_settings(wishlist: RawWishlistSettings) -> Result<WishlistSettings, LoadError> {
    let attempts = wishlist.poll_attempts.unwrap_or(DEFAULT_POLL_ATTEMPTS);
    let interval = wishlist
        .poll_interval_seconds
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

    Ok(WishlistSettings {
        poll_attempts: non_zero_u32(attempts, "wishlist.poll_attempts")?,
        poll_interval: Duration::from_secs(interval),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let ttl_seconds = cache.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS);
    if ttl_seconds == 0 {
        return Err(LoadError::invalid(
            "cache.ttl_seconds",
            "must be greater than zero",
        ));
    }

    let capacity = cache.memo_capacity.unwrap_or(DEFAULT_CACHE_MEMO_CAPACITY);
    let memo_capacity = usize::try_from(capacity)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| {
            LoadError::invalid(
                "cache.memo_capacity",
                "must be greater than zero and fit in usize",
            )
        })?;

    Ok(CacheSettings {
        ttl: Duration::from_secs(ttl_seconds),
        memo_capacity,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Clone, Deserialize, Default)]
#[serde(default)]
struct RawCredentialSettings {
    secret_key: Option<String>,
    secret_buffer: Option<String>,
    encoding: Option<String>,
}

impl fmt::Debug for RawCredentialSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCredentialSettings")
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    base_url: Option<String>,
    wishlist_id: Option<String>,
    share_recipient: Option<String>,
    request_timeout_seconds: Option<u64>,
    user_agent: Option<String>,
    login_success_marker: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMailboxSettings {
    directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawWishlistSettings {
    poll_attempts: Option<u64>,
    poll_interval_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    ttl_seconds: Option<u64>,
    memo_capacity: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

#[cfg(test)]
mod tests;
