use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_describe_a_day_long_cache_of_one_hundred_memos() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.cache.ttl, Duration::from_secs(86_400));
    assert_eq!(settings.cache.memo_capacity.get(), 100);
    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.credentials.encoding, CredentialEncoding::Hex);
    assert!(settings.credentials.secret_key.is_none());
    assert_eq!(settings.site.login_success_marker, "Welcome");
}

#[test]
fn cache_settings_can_be_overridden_via_cli() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        cache_ttl_seconds: Some(60),
        cache_memo_capacity: Some(5),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.cache.ttl, Duration::from_secs(60));
    assert_eq!(settings.cache.memo_capacity.get(), 5);
}

#[test]
fn zero_memo_capacity_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.memo_capacity = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero capacity");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.memo_capacity",
            ..
        }
    ));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn secret_lengths_are_validated() {
    let mut raw = RawSettings::default();
    raw.credentials.secret_key = Some("too short".to_string());
    let err = Settings::from_raw(raw).expect_err("short key");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "credentials.secret_key",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.credentials.secret_key = Some("0123456789abcdef0123456789abcdef".to_string());
    raw.credentials.secret_buffer = Some("fedcba9876543210".to_string());
    raw.credentials.encoding = Some("base64".to_string());
    let settings = Settings::from_raw(raw).expect("valid secrets");
    assert_eq!(settings.credentials.encoding, CredentialEncoding::Base64);
    assert!(!format!("{:?}", settings.credentials).contains("0123456789abcdef"));
}

#[test]
fn site_base_url_gains_trailing_slash() {
    let mut raw = RawSettings::default();
    raw.site.base_url = Some("https://shop.example.com/store_de".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.site.base_url.as_str(),
        "https://shop.example.com/store_de/"
    );
}

#[test]
fn non_http_base_url_is_rejected() {
    let mut raw = RawSettings::default();
    raw.site.base_url = Some("ftp://shop.example.com/".to_string());

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["comicshelf"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_codec_arguments() {
    let args = CliArgs::parse_from(["comicshelf", "encrypt", "reader@example.com"]);
    match args.command.expect("encrypt command") {
        Command::Encrypt(codec) => assert_eq!(codec.text, "reader@example.com"),
        _ => panic!("wrong command parsed"),
    }

    let args = CliArgs::parse_from(["comicshelf", "decrypt", "0207328a4cb51eaf64bb463c5664a24a"]);
    assert!(matches!(args.command, Some(Command::Decrypt(_))));
}

#[test]
fn parse_scrape_arguments() {
    let args = CliArgs::parse_from(["comicshelf", "scrape", "example.com/comic1"]);
    match args.command.expect("scrape command") {
        Command::Scrape(scrape) => assert_eq!(scrape.url, "example.com/comic1"),
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "comicshelf",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--mailbox-directory",
        "/var/mail/wishlists",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.mailbox_directory.as_deref(),
                Some(std::path::Path::new("/var/mail/wishlists"))
            );
        }
        _ => panic!("wrong command parsed"),
    }
}
