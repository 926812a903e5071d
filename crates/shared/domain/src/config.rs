use crate::constants::{
    DEFAULT_CONFIG_URL, FETCH_BACKOFF_STEP_MS, FETCH_MAX_ATTEMPTS, FETCH_TIMEOUT_MS,
    REMOVAL_DELAY_MS, REVEAL_DELAY_MS, SETTLE_DELAY_MS,
};
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Process settings for the loader host (not the remote configuration document).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderSettingsInner {
    pub config_url: String,
    pub fetch: FetchSettings,
    pub timing: TimingSettings,
    pub surface: SurfaceSettings,
    pub logging: LoggingSettings,
}

impl LoaderSettingsInner {
    /// Checks the invariants the fetcher and the pipeline rely on.
    ///
    /// # Errors
    /// Names the first offending key: an empty config URL, zero attempts, a zero timeout or a
    /// blank container name.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.config_url.trim().is_empty() {
            return Err("config_url must not be empty");
        }
        if self.fetch.max_attempts == 0 {
            return Err("fetch.max_attempts must be at least 1");
        }
        if self.fetch.timeout_ms == 0 {
            return Err("fetch.timeout_ms must be greater than zero");
        }
        if self.surface.containers.iter().any(|name| name.trim().is_empty()) {
            return Err("surface.containers must not contain empty names");
        }
        Ok(())
    }
}

/// Thin Arc-wrapped settings for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct LoaderSettings {
    #[serde(flatten, default)]
    inner: Arc<LoaderSettingsInner>,
}

impl Deref for LoaderSettings {
    type Target = LoaderSettingsInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for LoaderSettings {
    fn deref_mut(&mut self) -> &mut LoaderSettingsInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Retry budget of the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_ms: u64,
    pub max_attempts: u32,
    pub backoff_step_ms: u64,
}

impl FetchSettings {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub const fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }
}

/// Delays around initialization and reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub settle_delay_ms: u64,
    pub reveal_delay_ms: u64,
    pub removal_delay_ms: u64,
}

impl TimingSettings {
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    #[must_use]
    pub const fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    #[must_use]
    pub const fn removal_delay(&self) -> Duration {
        Duration::from_millis(self.removal_delay_ms)
    }
}

/// Block containers pre-declared on the headless surface.
///
/// Empty means "one container per layout entry", which is what a page built for
/// its own configuration has.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SurfaceSettings {
    pub containers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
    pub directory: Option<PathBuf>,
}

// --- Default ---

impl Default for LoaderSettingsInner {
    fn default() -> Self {
        Self {
            config_url: DEFAULT_CONFIG_URL.to_owned(),
            fetch: FetchSettings::default(),
            timing: TimingSettings::default(),
            surface: SurfaceSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_ms: FETCH_TIMEOUT_MS,
            max_attempts: FETCH_MAX_ATTEMPTS,
            backoff_step_ms: FETCH_BACKOFF_STEP_MS,
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: SETTLE_DELAY_MS,
            reveal_delay_ms: REVEAL_DELAY_MS,
            removal_delay_ms: REMOVAL_DELAY_MS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_owned(), json: false, directory: None }
    }
}
