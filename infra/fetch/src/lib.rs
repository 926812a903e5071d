//! # Fetch
//!
//! One logical fetch: a GET with no-cache directives, bounded by a per-attempt
//! timeout and retried with linear backoff.
//!
//! * [`Transport`] is the seam: [`HttpTransport`] talks to the network through
//!   `reqwest`, tests script responses with their own implementation.
//! * [`RetryingFetcher`] owns the policy and content negotiation: bodies declared as
//!   `application/json` become [`Content::Document`], everything else stays
//!   [`Content::Text`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use stager_fetch::{HttpTransport, RetryPolicy, RetryingFetcher};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), stager_fetch::FetchError> {
//! let fetcher = RetryingFetcher::new(Arc::new(HttpTransport::new()?), RetryPolicy::default());
//! let config = fetcher.fetch("https://cdn.example.test/config.json").await?;
//! assert!(config.is_document());
//! # Ok(())
//! # }
//! ```

mod error;
mod http;
mod retry;
mod transport;

pub use crate::error::{FetchError, FetchErrorExt};
pub use crate::http::HttpTransport;
pub use crate::retry::{
    Content, DEFAULT_BACKOFF_STEP, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT, RetryPolicy,
    RetryingFetcher,
};
pub use crate::transport::{RawResponse, Transport};
