use std::borrow::Cow;

/// Errors of the loading pipeline.
///
/// Only `Fetch`, `Manifest` and `Stylesheet` escape to the pipeline and end a run in
/// the failed state. `InvalidSettings` stops a pipeline from being built. The rest are
/// caught at their item boundary and recorded.
#[stager_derive::stager_error]
pub enum LoaderError {
    #[error("Fetch failed{}: {source}", format_context(.context))]
    Fetch { source: stager_fetch::FetchError, context: Option<Cow<'static, str>> },

    /// The configuration document is not a valid manifest.
    #[error("Invalid configuration{}: {source}", format_context(.context))]
    Manifest { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Host settings no pipeline could run with.
    #[error("Invalid settings{}: {message}", format_context(.context))]
    InvalidSettings { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Failed to load {path}{}", format_context(.context))]
    Stylesheet { path: String, context: Option<Cow<'static, str>> },

    #[error("Failed to load {path}{}", format_context(.context))]
    Script { path: String, context: Option<Cow<'static, str>> },

    #[error("Unknown initialization hook{}: {name}", format_context(.context))]
    UnknownHook { name: String, context: Option<Cow<'static, str>> },

    #[error("Internal loader error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl LoaderError {
    /// The short message shown on the failure panel.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}
