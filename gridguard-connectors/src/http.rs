//! HTTP Data Source - Plain GET of Window Endpoints
//!
//! ## Overview
//!
//! Fetches a window with one GET of `<base_url>/<start>/<end>`, the dates
//! formatted by [`apg::window_path`]. No credentials or custom headers are
//! sent; the endpoint is public.
//!
//! ## Retries
//!
//! | Outcome | Action |
//! |---------|--------|
//! | 2xx | decode and return |
//! | 429, 5xx | retry |
//! | other 4xx | fail immediately |
//! | transport error | retry |
//!
//! Attempt `n` waits `backoff * 2^n` first. ureq is blocking, so each
//! attempt runs on Tokio's blocking pool.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gridguard_connectors::{apg, http::{HttpConfig, HttpSource}, DataSource};
//!
//! # async fn example() -> Result<(), gridguard_connectors::ConnectorError> {
//! let config = HttpConfig::new(apg::BASE_URL)
//!     .query_pairs(apg::DEFAULT_QUERY)
//!     .timeout_secs(30);
//!
//! let source = HttpSource::new(config)?;
//! let response = source.fetch_window(1_746_532_800_000, 1_746_534_600_000).await?;
//! println!("{} rows", response.response_data.value_rows.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use gridguard_core::Timestamp;

use crate::{
    apg::{self, ImbalanceResponse},
    source::DataSource,
    ConnectorError,
};

/// HTTP configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Endpoint the window path is appended to
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base delay for exponential backoff
    pub backoff: Duration,
    /// Query string parameters
    pub query: Vec<(String, String)>,
    /// User agent string
    pub user_agent: String,
}

impl HttpConfig {
    /// Create new configuration with base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff: Duration::from_millis(100),
            query: Vec::new(),
            user_agent: format!("GridGuard/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Add one query parameter
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Add several query parameters
    pub fn query_pairs<'a>(mut self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.query
            .extend(pairs.into_iter().map(|(name, value)| (name.to_string(), value.to_string())));
        self
    }

    /// Full URL for a window
    pub fn window_url(&self, start: Timestamp, end: Timestamp) -> Result<String, ConnectorError> {
        let path = apg::window_path(start, end)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), path))
    }
}

enum Attempt {
    Body(String),
    Retry(String),
    Fail(ConnectorError),
}

/// Data source backed by the lightweight ureq client
pub struct HttpSource {
    config: HttpConfig,
    agent: ureq::Agent,
}

impl HttpSource {
    /// Create new HTTP source
    pub fn new(config: HttpConfig) -> Result<Self, ConnectorError> {
        // Validate base URL
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(ConnectorError::Config(
                "Base URL must start with http:// or https://".into(),
            ));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self { config, agent })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// GET `url`, retrying per the table above
    async fn get_with_retry(&self, url: String) -> Result<String, ConnectorError> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                // Exponential backoff
                let delay = self.config.backoff.saturating_mul(1 << attempt.min(16));
                log::debug!("retrying {} in {:?} (attempt {})", url, delay, attempt);
                tokio::time::sleep(delay).await;
            }

            let agent = self.agent.clone();
            let query = self.config.query.clone();
            let target = url.clone();
            let outcome = tokio::task::spawn_blocking(move || get_once(&agent, &target, &query))
                .await
                .map_err(|e| ConnectorError::Source(format!("request task failed: {}", e)))?;

            match outcome {
                Attempt::Body(body) => return Ok(body),
                Attempt::Fail(error) => return Err(error),
                Attempt::Retry(message) => {
                    log::warn!("request to {} failed: {}", url, message);
                    last_error = Some(message);
                }
            }
        }

        // All retries exhausted
        Err(ConnectorError::Source(
            last_error.unwrap_or_else(|| "Unknown error".into()),
        ))
    }
}

fn get_once(agent: &ureq::Agent, url: &str, query: &[(String, String)]) -> Attempt {
    let request = query
        .iter()
        .fold(agent.get(url), |request, (name, value)| request.query(name, value));

    match request.call() {
        Ok(response) => match response.into_string() {
            Ok(body) => Attempt::Body(body),
            Err(e) => Attempt::Retry(format!("reading body: {}", e)),
        },
        Err(ureq::Error::Status(code, response)) => {
            let message = format!(
                "Server error {}: {}",
                code,
                response.into_string().unwrap_or_default()
            );
            // Server error or rate limit - retry
            if code >= 500 || code == 429 {
                Attempt::Retry(message)
            } else {
                Attempt::Fail(ConnectorError::Source(message))
            }
        }
        // Network error - retry
        Err(ureq::Error::Transport(e)) => Attempt::Retry(e.to_string()),
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch_window(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<ImbalanceResponse, ConnectorError> {
        let url = self.config.window_url(start, end)?;
        let body = self.get_with_retry(url).await?;
        Ok(apg::decode(&body)?)
    }

    fn name(&self) -> &str {
        "http"
    }
}
