use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the comicshelf binary.
#[derive(Debug, Parser)]
#[command(
    name = "comicshelf",
    version,
    about = "Comic retailer wishlist relay and product information API"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "COMICSHELF_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP API.
    Serve(Box<ServeArgs>),
    /// Encode a plaintext value the way the web client does.
    Encrypt(CodecArgs),
    /// Decode a value produced by the web client.
    Decrypt(CodecArgs),
    /// Fetch one product page and print its attributes as JSON.
    Scrape(ScrapeArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Clone)]
pub struct CodecArgs {
    /// Value to transform.
    #[arg(value_name = "TEXT")]
    pub text: String,
}

#[derive(Debug, Args, Clone)]
pub struct ScrapeArgs {
    /// Product page URL; a missing scheme defaults to https.
    #[arg(value_name = "URL")]
    pub url: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the retailer store base URL.
    #[arg(long = "site-base-url", value_name = "URL")]
    pub site_base_url: Option<String>,

    /// Override the address wishlists are shared to.
    #[arg(long = "site-share-recipient", value_name = "EMAIL")]
    pub site_share_recipient: Option<String>,

    /// Override the directory share notifications are read from.
    #[arg(long = "mailbox-directory", value_name = "PATH")]
    pub mailbox_directory: Option<PathBuf>,

    /// Override how long comic information stays fresh.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Override the bounded memo capacity.
    #[arg(long = "cache-memo-capacity", value_name = "COUNT")]
    pub cache_memo_capacity: Option<u64>,
}
