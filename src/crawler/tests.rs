use super::validate_url as validate_url_impl;
use super::*;

#[test]
fn validate_url() {
    // Valid URLs
    assert!(validate_url_impl("https://example.com").is_ok());
    assert!(validate_url_impl("http://docs.rs/regex/1.0/").is_ok());
    assert!(validate_url_impl("https://en.wikipedia.org/wiki/Paris").is_ok());

    // Invalid URLs
    assert!(validate_url_impl("ftp://example.com").is_err());
    assert!(validate_url_impl("file:///etc/hosts").is_err());
    assert!(validate_url_impl("not-a-url").is_err());
    assert!(validate_url_impl("").is_err());
    assert!(validate_url_impl("https://").is_err());
}

#[test]
fn default_config() {
    let config = CrawlerConfig::default();
    assert_eq!(config.timeout_seconds, 5);
    assert_eq!(config.max_retries, 2);
    assert!(config.user_agent.starts_with("mando/"));
    assert!(config.validate().is_ok());
}

#[test]
fn config_validation() {
    let config = CrawlerConfig {
        timeout_seconds: 0,
        ..CrawlerConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidTimeout(0))
    ));

    let config = CrawlerConfig {
        user_agent: "  ".to_string(),
        ..CrawlerConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidUserAgent)
    ));
    assert!(HttpClient::new(config).is_err());
}

#[test]
fn retryable_statuses() {
    assert!(FetchError::Status(500).is_retryable());
    assert!(FetchError::Status(503).is_retryable());
    assert!(FetchError::Status(429).is_retryable());

    assert!(!FetchError::Status(404).is_retryable());
    assert!(!FetchError::Status(401).is_retryable());
    assert!(!FetchError::Status(400).is_retryable());
}

#[test]
fn retryable_transport_errors() {
    assert!(FetchError::Transport(ureq::Error::ConnectionFailed).is_retryable());
    assert!(FetchError::Transport(ureq::Error::HostNotFound).is_retryable());
    assert!(!FetchError::Body(ureq::Error::ConnectionFailed).is_retryable());
}

#[test]
fn status_error_message() {
    assert_eq!(FetchError::Status(404).to_string(), "HTTP error 404");
}

#[test]
fn crawl_invalid_url_returns_marker() {
    let text = crawl_url("ftp://example.com/file", &CrawlerConfig::default());
    assert!(
        text.starts_with("Error fetching URL: URL must use HTTP or HTTPS scheme"),
        "{text}"
    );
}

#[test]
fn toml_round_trip() {
    let config = CrawlerConfig {
        retry_delay_ms: 0,
        ..CrawlerConfig::default()
    };
    let text = toml::to_string(&config).expect("serializes");
    let parsed: CrawlerConfig = toml::from_str(&text).expect("parses");
    assert_eq!(parsed, config);
}
