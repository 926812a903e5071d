//! Facade crate for the staged loader and its shared modules.
//! Re-exports domain/kernel primitives, the fetch layer and the loader.
//! Keep this crate thin: it should compose other crates, not implement loading logic.
//!
//! ## Usage
//! - Add `stager` (with `headless` for the in-memory host).
//! - Load [`domain::config::LoaderSettings`] with [`kernel::config::load_settings`], then build a
//!   [`Pipeline`] from them.

pub use stager_domain as domain;
pub use stager_fetch as fetch;
pub use stager_kernel as kernel;
pub use stager_loader as loader;

pub use stager_loader::{
    Document, HookName, HookRegistry, LoaderError, Phase, Pipeline, PipelineReport,
};

#[cfg(feature = "headless")]
pub use stager_loader::headless::HeadlessDocument;

/// Build-time enabled features (by Cargo feature).
pub const ENABLED: &[&str] = &[
    #[cfg(feature = "headless")]
    "headless",
    #[cfg(feature = "rustls")]
    "rustls",
];

/// Whether a Cargo feature of this crate was compiled in.
#[must_use]
pub fn is_enabled(name: &str) -> bool {
    ENABLED.contains(&name)
}
