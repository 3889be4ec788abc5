use std::{process, sync::Arc, time::Duration};

use comicshelf::{
    application::{
        accounts::{AccountService, WishlistRelaySettings},
        error::AppError,
        site::ProductScraper,
    },
    cache::{CacheConfig, ComicInfoCache, normalize_url},
    config::{self, CredentialSettings, ServerSettings},
    infra::{
        credentials::CredentialCodec,
        error::InfraError,
        http::{self, ApiState},
        mailbox::DirectoryMailbox,
        site::HttpSiteAdapter,
        telemetry,
    },
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Encrypt(args) => {
            let encoded = build_codec(&settings.credentials)?
                .encode(&args.text)
                .map_err(InfraError::from)?;
            println!("{encoded}");
            Ok(())
        }
        config::Command::Decrypt(args) => {
            let decoded = build_codec(&settings.credentials)?
                .decode(&args.text)
                .map_err(|err| AppError::validation(err.to_string()))?;
            println!("{decoded}");
            Ok(())
        }
        config::Command::Scrape(args) => run_scrape(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let credentials = Arc::new(build_codec(&settings.credentials)?);
    let adapter = Arc::new(HttpSiteAdapter::new(&settings.site)?);

    let recipient = settings
        .site
        .share_recipient
        .clone()
        .ok_or_else(|| InfraError::configuration("site.share_recipient is not set"))?;

    tokio::fs::create_dir_all(&settings.mailbox.directory)
        .await
        .map_err(InfraError::from)?;
    let mailbox = Arc::new(DirectoryMailbox::new(settings.mailbox.directory.clone()));

    let accounts = Arc::new(AccountService::new(
        adapter.clone(),
        mailbox,
        WishlistRelaySettings {
            recipient,
            poll_attempts: settings.wishlist.poll_attempts,
            poll_interval: settings.wishlist.poll_interval,
        },
    ));
    let comics = Arc::new(ComicInfoCache::new(
        adapter,
        &CacheConfig::from(&settings.cache),
    ));

    let state = ApiState {
        comics,
        accounts,
        credentials,
    };

    serve_http(&settings.server, state).await
}

async fn run_scrape(settings: config::Settings, args: config::ScrapeArgs) -> Result<(), AppError> {
    let adapter = HttpSiteAdapter::new(&settings.site)?;
    let info = adapter.scrape_product(&normalize_url(&args.url)).await?;
    let rendered = serde_json::to_string_pretty(&info)
        .map_err(|err| AppError::unexpected(format!("failed to render result: {err}")))?;
    println!("{rendered}");
    Ok(())
}

fn build_codec(settings: &CredentialSettings) -> Result<CredentialCodec, AppError> {
    let secret_key = settings
        .secret_key
        .as_deref()
        .ok_or_else(|| InfraError::configuration("credentials.secret_key is not set"))?;
    let secret_buffer = settings
        .secret_buffer
        .as_deref()
        .ok_or_else(|| InfraError::configuration("credentials.secret_buffer is not set"))?;

    CredentialCodec::new(secret_key, secret_buffer, settings.encoding)
        .map_err(|err| AppError::from(InfraError::from(err)))
}

async fn serve_http(server: &ServerSettings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %server.addr, "comicshelf listening");

    let stopping = Arc::new(Notify::new());
    let signal = {
        let stopping = Arc::clone(&stopping);
        async move {
            wait_for_shutdown_signal().await;
            info!("shutdown signal received, draining connections");
            stopping.notify_one();
        }
    };

    let server_future = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(signal)
        .into_future();

    tokio::select! {
        result = server_future => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = drain_deadline(&stopping, server.graceful_shutdown) => {
            warn!(
                timeout_secs = server.graceful_shutdown.as_secs(),
                "graceful shutdown timed out, dropping open connections"
            );
        }
    }

    info!("comicshelf stopped");
    Ok(())
}

async fn drain_deadline(stopping: &Notify, grace: Duration) {
    stopping.notified().await;
    tokio::time::sleep(grace).await;
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable, waiting for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
