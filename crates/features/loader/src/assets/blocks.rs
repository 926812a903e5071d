use crate::document::Document;
use crate::progress::Reporter;
use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use stager_domain::manifest::LoaderConfig;
use stager_domain::progress::LoadProgress;
use stager_domain::surface::container_id;
use stager_fetch::RetryingFetcher;
use tracing::{error, info, warn};

/// What happened to one layout entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BlockOutcome {
    /// Fetched and injected into its container.
    Injected { name: String },
    /// Fetched, but the document has no container for it. Still counts as loaded.
    NoContainer { name: String, container: String },
    /// The layout names a block the `blocks` map does not define. Not counted.
    Undefined { name: String },
    /// The fetch exhausted its retries.
    Failed { name: String, error: String },
}

impl BlockOutcome {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Injected { name }
            | Self::NoContainer { name, .. }
            | Self::Undefined { name }
            | Self::Failed { name, .. } => name,
        }
    }

    /// Whether the block's content was fetched.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Injected { .. } | Self::NoContainer { .. })
    }
}

/// Loads every layout entry concurrently and returns outcomes in layout order.
///
/// Never fails: each entry is isolated. `progress` counts successful fetches against
/// the layout length, and every count is rendered before the handler yields.
pub async fn load_blocks(
    document: &dyn Document,
    fetcher: &RetryingFetcher,
    config: &LoaderConfig,
    progress: &Mutex<LoadProgress>,
    reporter: &Reporter,
) -> Vec<BlockOutcome> {
    progress.lock().fix_total(config.layout.len());
    reporter.begin_blocks(&progress.lock());

    let handlers = config.layout.iter().map(|name| async move {
        let Some(path) = config.block_path(name) else {
            warn!(block = %name, "Block is not defined in the configuration");
            return BlockOutcome::Undefined { name: name.clone() };
        };

        let content = match fetcher.fetch(&config.asset_url(path)).await {
            Ok(content) => content,
            Err(err) => {
                error!(block = %name, error = %err, "Failed to load block");
                return BlockOutcome::Failed { name: name.clone(), error: err.to_string() };
            },
        };

        let container = container_id(name);
        let outcome = if document.set_container_html(&container, &content.into_text()) {
            info!(block = %name, "Block loaded");
            BlockOutcome::Injected { name: name.clone() }
        } else {
            warn!(block = %name, %container, "Container not found");
            BlockOutcome::NoContainer { name: name.clone(), container }
        };

        let mut progress = progress.lock();
        progress.record_block();
        reporter.block_loaded(&progress);
        outcome
    });

    let outcomes = join_all(handlers).await;
    let progress = progress.lock();
    info!(
        loaded = progress.loaded_blocks(),
        total = progress.total_blocks(),
        "All blocks processed"
    );
    outcomes
}
