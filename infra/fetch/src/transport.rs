use crate::error::FetchError;
use futures::future::BoxFuture;
use std::fmt;

/// What one GET produced, before status checks and content negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        Self { status, content_type: content_type.map(str::to_owned), body: body.into() }
    }

    /// 200 with `application/json`.
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self::new(200, Some("application/json; charset=utf-8"), body)
    }

    /// 200 with `text/html`.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self::new(200, Some("text/html; charset=utf-8"), body)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type.as_deref().is_some_and(|ct| ct.contains("application/json"))
    }
}

/// Performs a single uncached GET. Retries, timeouts and status handling live above this seam.
///
/// Implementations must be cancel-safe: dropping the returned future abandons the request.
pub trait Transport: Send + Sync + fmt::Debug {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<RawResponse, FetchError>>;
}
