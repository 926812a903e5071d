use std::borrow::Cow;

/// A single fetch attempt (or the whole retry loop) failed.
#[stager_derive::stager_error]
pub enum FetchError {
    /// Rejected before any attempt: empty URL or a zero attempt budget.
    #[error("Invalid fetch request{}: {message}", format_context(.context))]
    InvalidRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Request timed out after {timeout_ms} ms{}", format_context(.context))]
    Timeout { timeout_ms: u64, context: Option<Cow<'static, str>> },

    /// Non-success status code.
    #[error("HTTP {status}{}", format_context(.context))]
    Status { status: u16, context: Option<Cow<'static, str>> },

    /// The request never produced a response.
    #[error("Connection failed{}: {message}", format_context(.context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The response declared JSON but its body did not parse.
    #[error("Invalid JSON body{}: {source}", format_context(.context))]
    Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("HTTP client error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("Internal fetch error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl FetchError {
    /// Whether another attempt could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::InvalidRequest { .. } | Self::Internal { .. })
    }
}
