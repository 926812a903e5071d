//! Kernel utilities shared by the loader hosts.
//! Keep this crate lightweight: settings loading and validation, plus a re-export of the domain.
//!
//! ## Settings loading
//! ```rust,no_run
//! use stager_kernel::config::load_settings;
//!
//! let settings = load_settings(Some("stager.toml"))?;
//! assert!(settings.fetch.max_attempts >= 1);
//! # Ok::<(), stager_kernel::config::ConfigError>(())
//! ```
pub mod config;

pub use stager_domain as domain;
