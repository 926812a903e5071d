use serde::Serialize;
use std::fmt;

/// Pipeline state. Work phases run in declaration order; `Ready` and `Failed` absorb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    FetchingConfig,
    LoadingFonts,
    LoadingStyles,
    LoadingBlocks,
    LoadingScripts,
    Initializing,
    Ready,
    Failed,
}

impl Phase {
    /// Phases that do work, in the order they run.
    pub const SEQUENCE: [Self; 6] = [
        Self::FetchingConfig,
        Self::LoadingFonts,
        Self::LoadingStyles,
        Self::LoadingBlocks,
        Self::LoadingScripts,
        Self::Initializing,
    ];

    /// Text shown in the loader's status node when the phase starts.
    #[must_use]
    pub const fn status_text(self) -> &'static str {
        match self {
            Self::FetchingConfig => "Loading configuration...",
            Self::LoadingFonts => "Loading fonts...",
            Self::LoadingStyles => "Loading styles...",
            Self::LoadingBlocks => "Loading content...",
            Self::LoadingScripts => "Loading scripts...",
            Self::Initializing => "Initializing...",
            Self::Ready => "Ready!",
            Self::Failed => "Loading error",
        }
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::FetchingConfig => Some(Self::LoadingFonts),
            Self::LoadingFonts => Some(Self::LoadingStyles),
            Self::LoadingStyles => Some(Self::LoadingBlocks),
            Self::LoadingBlocks => Some(Self::LoadingScripts),
            Self::LoadingScripts => Some(Self::Initializing),
            Self::Initializing => Some(Self::Ready),
            Self::Ready | Self::Failed => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FetchingConfig => "fetching_config",
            Self::LoadingFonts => "loading_fonts",
            Self::LoadingStyles => "loading_styles",
            Self::LoadingBlocks => "loading_blocks",
            Self::LoadingScripts => "loading_scripts",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress node text for a percentage.
#[must_use]
pub fn progress_text(percent: u8) -> String {
    format!("Loading... {percent}%")
}
