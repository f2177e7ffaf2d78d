#[cfg(test)]
mod tests;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use ureq::Agent;
use url::Url;

use crate::config::ConfigError;
use crate::ingest::html::visible_text;

/// Configuration for fetching web pages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CrawlerConfig {
    /// User agent string to use for requests
    pub user_agent: String,
    /// Timeout for HTTP requests in seconds
    pub timeout_seconds: u64,
    /// Maximum number of retry attempts for retryable errors
    pub max_retries: u32,
    /// Delay between retry attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for CrawlerConfig {
    #[inline]
    fn default() -> Self {
        Self {
            user_agent: format!("mando/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: 5,
            max_retries: 2,
            retry_delay_ms: 500,
        }
    }
}

impl CrawlerConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=600).contains(&self.timeout_seconds) {
            return Err(ConfigError::InvalidTimeout(self.timeout_seconds));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidUserAgent);
        }
        Ok(())
    }
}

/// Failure of a single GET attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error {0}")]
    Status(u16),
    #[error("Failed to make HTTP request: {0}")]
    Transport(ureq::Error),
    #[error("Failed to read response body: {0}")]
    Body(ureq::Error),
}

impl FetchError {
    /// Timeouts, connection failures, 5xx and 429 are worth another attempt
    #[inline]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status(status) => *status >= 500 || *status == 429,
            Self::Transport(error) => matches!(
                error,
                ureq::Error::ConnectionFailed
                    | ureq::Error::HostNotFound
                    | ureq::Error::Timeout(_)
                    | ureq::Error::Io(_)
            ),
            Self::Body(_) => false,
        }
    }
}

/// Blocking HTTP client with retry logic
#[derive(Debug)]
pub struct HttpClient {
    agent: Agent,
    config: CrawlerConfig,
}

impl HttpClient {
    #[inline]
    pub fn new(config: CrawlerConfig) -> Result<Self> {
        config.validate().context("Invalid crawler configuration")?;

        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .user_agent(&config.user_agent)
            .build()
            .into();

        Ok(Self { agent, config })
    }

    /// Perform an HTTP GET request, retrying retryable failures
    #[inline]
    pub fn get(&self, url: &str) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!("Retrying request to {} (attempt {})", url, attempt + 1);
                std::thread::sleep(Duration::from_millis(self.config.retry_delay_ms));
            }

            match self.try_get(url) {
                Ok(response) => {
                    debug!("Successfully fetched {} (attempt {})", url, attempt + 1);
                    return Ok(response);
                }
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    warn!("Retryable error for {}: {}", url, e);
                    last_error = Some(e);
                }
                Err(e) => {
                    error!("Giving up on {}: {}", url, e);
                    return Err(e.into());
                }
            }
        }

        Err(last_error.map_or_else(|| anyhow!("All retry attempts failed"), anyhow::Error::from))
    }

    /// Attempt a single HTTP GET request without retry logic
    fn try_get(&self, url: &str) -> Result<String, FetchError> {
        debug!("Making HTTP GET request to: {}", url);

        match self.agent.get(url).call() {
            Ok(mut response) => {
                let text = response
                    .body_mut()
                    .read_to_string()
                    .map_err(FetchError::Body)?;
                debug!("Read {} bytes from {}", text.len(), url);
                Ok(text)
            }
            Err(ureq::Error::StatusCode(status)) => Err(FetchError::Status(status)),
            Err(e) => Err(FetchError::Transport(e)),
        }
    }
}

/// Parse a URL and require an http(s) scheme and a host
#[inline]
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str).with_context(|| format!("Invalid URL format: {}", url_str))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!("URL must use HTTP or HTTPS scheme: {}", url_str));
    }

    if url.host_str().is_none() {
        return Err(anyhow!("URL must have a valid host: {}", url_str));
    }

    Ok(url)
}

/// Fetch a page and return its visible text
#[inline]
pub fn fetch_page_text(url: &str, config: &CrawlerConfig) -> Result<String> {
    let url = validate_url(url.trim())?;
    let client = HttpClient::new(config.clone())?;
    let html = client.get(url.as_str())?;
    let text = visible_text(&html);

    info!("Fetched {} ({} bytes of text)", url, text.len());
    Ok(text)
}

/// Fetch a page's visible text, or `"Error fetching URL: <message>"` on failure
#[inline]
pub fn crawl_url(url: &str, config: &CrawlerConfig) -> String {
    fetch_page_text(url, config).unwrap_or_else(|e| {
        warn!("Crawl of {} failed: {:#}", url, e);
        format!("Error fetching URL: {:#}", e)
    })
}
