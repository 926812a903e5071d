use stager_derive::stager_error;
use std::borrow::Cow;

#[stager_error]
pub enum FetchError {
    #[error("Timed out{}: {message}", format_context(.context))]
    Timeout { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let from_str: FetchError = "broken".into();
    assert!(matches!(from_str, FetchError::Internal { .. }));

    let io = std::io::Error::other("socket closed");
    let wrapped: FetchError = io.into();
    assert!(matches!(wrapped, FetchError::Io { context: None, .. }));
}
