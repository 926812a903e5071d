//! # Staged Loader
//!
//! Brings a page from a blank loading screen to a revealed, initialized site. A remote
//! configuration document says which fonts, stylesheets, HTML blocks and scripts make up
//! the site; the [`Pipeline`] loads them in strict phases and reports progress on the way.
//!
//! ## Architecture
//!
//! 1.  **Surface ([`document`]):** the [`Document`] trait is everything the pipeline
//!     touches. Resource loads settle single-shot [`Completion`]s.
//! 2.  **Phases ([`assets`], [`initialize`], [`terminal`]):** one loader per asset group,
//!     the hook dispatcher with link and image enhancements, and the terminal controller
//!     that reveals the site or shows the failure panel.
//! 3.  **Sequencer ([`pipeline`]):** runs the phases in order and turns fatal errors into
//!     the failed state. Every run yields a [`PipelineReport`].
//! 4.  **Headless host (`headless`):** an in-memory [`Document`] that loads resources
//!     through the fetch transport. Gated behind the `headless` feature.
//!
//! ## Failure model
//!
//! * Configuration and stylesheet failures end the run.
//! * A failing block, script or hook is logged and recorded in the report; the run
//!   continues.
//! * Only the fetcher retries.
//!
//! ## Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "headless")]
//! # async fn run() -> Result<(), stager_loader::LoaderError> {
//! use stager_fetch::HttpTransport;
//! use stager_loader::headless::HeadlessDocument;
//! use stager_loader::{HookName, HookRegistry, Pipeline};
//! use std::sync::Arc;
//!
//! let transport = Arc::new(HttpTransport::new()?);
//! let mut hooks = HookRegistry::new();
//! hooks.register(HookName::InitHeader, || Ok(()));
//!
//! let mut pipeline = Pipeline::builder()
//!     .document(Arc::new(HeadlessDocument::new(transport.clone())))
//!     .transport(transport)
//!     .config_url("https://cdn.example.test/site/config.json")
//!     .hooks(hooks)
//!     .build()?;
//!
//! let report = pipeline.run().await;
//! println!("{:?} after {:?}", report.phase(), report.elapsed());
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod document;
pub mod enhance;
mod error;
#[cfg(feature = "headless")]
pub mod headless;
pub mod hooks;
pub mod initialize;
pub mod pipeline;
pub mod progress;
pub mod terminal;

pub use crate::assets::{BlockOutcome, ScriptOutcome};
pub use crate::document::{Completion, CompletionHandle, Document, FailurePanel, LoadResult};
pub use crate::error::{LoaderError, LoaderErrorExt};
pub use crate::hooks::{HookName, HookOutcome, HookRegistry, HookResult};
pub use crate::pipeline::{Pipeline, PipelineBuilder, PipelineReport};
pub use crate::progress::{LoaderStatus, PhaseEvent, PhaseEventReceiverExt, Reporter};
pub use crate::terminal::{TerminalController, TerminalState};
pub use stager_domain::phase::Phase;
