//! Remote JSON retrieval with fixed-delay retries
//!
//! This is the only module that performs network I/O. Every kind of failure
//! (transport error, timeout, non-2xx status, unparsable body) is treated as
//! transient and retried until the attempt budget is spent.

use crate::config::SourceConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned malformed JSON: {source}")]
    MalformedJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{url} returned an unexpected document: {reason}")]
    UnexpectedShape { url: String, reason: String },
}

/// Attempt budget and pause between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; never less than 1
    pub attempts: u32,
    /// Fixed pause between two attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Run `operation` until it succeeds or the budget is exhausted.
    ///
    /// Attempts are strictly sequential: attempt N+1 starts only after the
    /// delay following attempt N has elapsed. The last error is returned.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if attempt >= self.attempts {
                        warn!("All {} attempts exhausted: {}", self.attempts, e);
                        return Err(e);
                    }

                    debug!(
                        "Attempt {}/{} failed ({}), retrying in {:?}",
                        attempt, self.attempts, e, self.delay
                    );
                    sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// HTTP GET client bound to one directory URL
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    client: reqwest::Client,
    url: String,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    pub fn new(config: &SourceConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            url: config.url.clone(),
            policy: RetryPolicy::new(config.retry_attempts, config.retry_delay),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch the document and hand it to `parse`, retrying per the policy.
    ///
    /// A document that `parse` rejects counts as a failed attempt.
    pub async fn fetch_with_retry<T, E, P>(&self, parse: P) -> Result<T, FetchError>
    where
        P: Fn(serde_json::Value) -> Result<T, E>,
        E: std::fmt::Display,
    {
        let parse = &parse;
        self.policy
            .run(|attempt| async move {
                info!("Loading {} (attempt {}/{})", self.url, attempt, self.policy.attempts);
                let document = self.fetch_once().await?;
                parse(document).map_err(|e| FetchError::UnexpectedShape {
                    url: self.url.clone(),
                    reason: e.to_string(),
                })
            })
            .await
    }

    /// A single GET, with no retry.
    pub async fn fetch_once(&self) -> Result<serde_json::Value, FetchError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        serde_json::from_slice(&body).map_err(|source| FetchError::MalformedJson {
            url: self.url.clone(),
            source,
        })
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout { url: self.url.clone() }
        } else {
            FetchError::Transport {
                url: self.url.clone(),
                source: error,
            }
        }
    }
}
