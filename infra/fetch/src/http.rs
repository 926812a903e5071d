use crate::error::{FetchError, FetchErrorExt};
use crate::transport::{RawResponse, Transport};
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderValue, PRAGMA};
use tracing::trace;

const USER_AGENT: &str = concat!("stager/", env!("CARGO_PKG_VERSION"));

/// [`Transport`] over a shared `reqwest` client that always asks for a fresh copy.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a client with `Cache-Control: no-cache` and `Pragma: no-cache` on every request.
    ///
    /// # Errors
    /// Returns [`FetchError::Http`] if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()
            .context("Building HTTP client")?;

        Ok(Self { client })
    }

    async fn get_once(&self, url: &str) -> Result<RawResponse, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            let context = Some(url.to_owned().into());
            if e.is_connect() {
                FetchError::Connection { message: e.to_string().into(), context }
            } else {
                FetchError::Http { source: e, context }
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await.context(format!("Reading body of {url}"))?;

        trace!(%url, status, content_type = ?content_type, bytes = body.len(), "Response received");
        Ok(RawResponse { status, content_type, body })
    }
}

impl Transport for HttpTransport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<RawResponse, FetchError>> {
        self.get_once(url).boxed()
    }
}
