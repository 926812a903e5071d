use crate::error::{FetchError, FetchErrorExt};
use crate::transport::{RawResponse, Transport};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, instrument, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(1_000);

/// Attempt budget, per-attempt timeout and linear backoff step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub timeout: Duration,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: DEFAULT_TIMEOUT,
            backoff_step: DEFAULT_BACKOFF_STEP,
        }
    }
}

impl RetryPolicy {
    #[must_use = "The policy must be handed to a fetcher"]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use = "The policy must be handed to a fetcher"]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use = "The policy must be handed to a fetcher"]
    pub const fn with_backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    /// Wait after the failed attempt with 0-based index `attempt_index`.
    #[must_use]
    pub fn backoff(&self, attempt_index: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt_index.saturating_add(1))
    }

    /// Sum of all waits an always-failing fetch with `max_attempts` performs.
    #[must_use]
    pub fn total_backoff(&self, max_attempts: u32) -> Duration {
        (0..max_attempts.saturating_sub(1)).map(|i| self.backoff(i)).sum()
    }
}

/// Negotiated response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// The response declared `application/json` and parsed.
    Document(Value),
    Text(String),
}

impl Content {
    /// Markup form of the body. Documents are serialized back to JSON text.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Document(value) => value.to_string(),
            Self::Text(text) => text,
        }
    }

    /// Structured form of the body. Text is parsed as JSON, for servers that mislabel documents.
    ///
    /// # Errors
    /// Returns [`FetchError::Decode`] when text content is not JSON.
    pub fn into_document(self) -> Result<Value, FetchError> {
        match self {
            Self::Document(value) => Ok(value),
            Self::Text(text) => serde_json::from_str(&text).context("Parsing text body as JSON"),
        }
    }

    #[must_use]
    pub const fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }
}

/// One logical fetch over a [`Transport`] with bounded attempts.
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RetryingFetcher {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    #[must_use]
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Fetches `url` with the policy's attempt budget.
    ///
    /// # Errors
    /// See [`RetryingFetcher::fetch_with_attempts`].
    pub async fn fetch(&self, url: &str) -> Result<Content, FetchError> {
        self.fetch_with_attempts(url, self.policy.max_attempts).await
    }

    /// Fetches `url`, trying at most `max_attempts` times.
    ///
    /// Each attempt is cut off after the policy timeout. A non-2xx status, a transport
    /// failure or a body that declares JSON but does not parse fails the attempt. After
    /// failed attempt `i` (0-based, not the last) the fetcher sleeps `backoff_step * (i + 1)`.
    ///
    /// # Errors
    /// * [`FetchError::InvalidRequest`] for an empty URL or `max_attempts == 0`, before any
    ///   attempt.
    /// * The first error that is not [transient](FetchError::is_transient), without retrying.
    /// * The last attempt's error once the budget is exhausted.
    #[instrument(skip(self))]
    pub async fn fetch_with_attempts(
        &self,
        url: &str,
        max_attempts: u32,
    ) -> Result<Content, FetchError> {
        if url.trim().is_empty() {
            return Err(FetchError::InvalidRequest {
                message: "URL must not be empty".into(),
                context: None,
            });
        }
        if max_attempts == 0 {
            return Err(FetchError::InvalidRequest {
                message: "max_attempts must be at least 1".into(),
                context: Some(url.to_owned().into()),
            });
        }

        let mut attempt = 0;
        loop {
            match self.attempt(url).await {
                Ok(content) => {
                    debug!(attempt = attempt + 1, document = content.is_document(), "Fetched");
                    return Ok(content);
                },
                Err(err) if !err.is_transient() => {
                    warn!(attempt = attempt + 1, error = %err, "Fetch failed, not retryable");
                    return Err(err);
                },
                Err(err) if attempt + 1 >= max_attempts => {
                    warn!(attempts = max_attempts, error = %err, "Fetch failed, giving up");
                    return Err(err);
                },
                Err(err) => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        attempt = attempt + 1,
                        ?delay,
                        error = %err,
                        "Fetch attempt failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                },
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<Content, FetchError> {
        let response = timeout(self.policy.timeout, self.transport.get(url))
            .await
            .map_err(|_| FetchError::Timeout {
                timeout_ms: self.timeout_ms(),
                context: Some(url.to_owned().into()),
            })??;

        negotiate(response, url)
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.policy.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

fn negotiate(response: RawResponse, url: &str) -> Result<Content, FetchError> {
    if !response.is_success() {
        let context = Some(url.to_owned().into());
        return Err(FetchError::Status { status: response.status, context });
    }
    if response.is_json() {
        let value = serde_json::from_str(&response.body).context(url.to_owned())?;
        return Ok(Content::Document(value));
    }
    Ok(Content::Text(response.body))
}
