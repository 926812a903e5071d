use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use stager_domain::config::LoaderSettings;
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info};

/// Prefix of environment overrides (`STAGER__FETCH__MAX_ATTEMPTS=5`).
pub const ENV_PREFIX: &str = "STAGER";
const ENV_SEPARATOR: &str = "__";

#[stager_derive::stager_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    /// Settings parsed but cannot drive a pipeline.
    #[error("Invalid settings{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Layered configuration: an optional file, then `STAGER__`-prefixed environment overrides.
///
/// Nested keys use double underscores, so `STAGER__TIMING__SETTLE_DELAY_MS` maps to
/// `timing.settle_delay_ms`. Without a file, defaults of `T` fill whatever the
/// environment leaves out (as long as `T` uses `#[serde(default)]`).
///
/// # Errors
/// * The given file does not exist or cannot be parsed.
/// * The merged values do not match `T`.
///
/// # Example
/// ```rust
/// use stager_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct HostConfig {
///     port: u16,
/// }
///
/// let cfg: HostConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_layered(path, environment())
}

/// Loads [`LoaderSettings`] and rejects values no pipeline could run with.
///
/// # Errors
/// Everything [`load_config`] reports, plus [`ConfigError::Invalid`] from [`validate_settings`].
pub fn load_settings(path: Option<impl AsRef<Path>>) -> Result<LoaderSettings, ConfigError> {
    let settings: LoaderSettings = load_config(path)?;
    validate_settings(&settings)?;
    Ok(settings)
}

/// Checks the invariants the fetcher and the pipeline rely on.
///
/// # Errors
/// Returns [`ConfigError::Invalid`] for an empty config URL, zero attempts or a zero timeout.
pub fn validate_settings(settings: &LoaderSettings) -> Result<(), ConfigError> {
    settings.validate().map_err(invalid)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR).try_parsing(true)
}

fn load_layered<T>(path: Option<impl AsRef<Path>>, env: Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder();
    match path {
        Some(path) => {
            let path = path.as_ref();
            info!(path = %path.display(), "Loading settings");
            builder = builder.add_source(File::from(path).required(true));
        },
        None => debug!("No settings file given, using defaults and environment"),
    }

    let config = builder
        .add_source(env)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

const fn invalid(message: &'static str) -> ConfigError {
    ConfigError::Invalid { message: Cow::Borrowed(message), context: None }
}
