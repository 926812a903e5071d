use crate::document::Document;
use crate::enhance::{EnhancementSummary, setup_lazy_loading, setup_redirects};
use crate::hooks::{HookOutcome, HookRegistry};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Result of the initialization phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Initialization {
    pub hooks: Vec<HookOutcome>,
    pub enhancements: EnhancementSummary,
}

/// Lets injected markup settle, runs the hooks, then wires redirects and lazy images.
///
/// Cannot fail: hook errors are contained in their outcomes.
pub async fn initialize(
    document: &dyn Document,
    hooks: &HookRegistry,
    redirect_url: &str,
    settle_delay: Duration,
) -> Initialization {
    tokio::time::sleep(settle_delay).await;

    let hooks = hooks.dispatch();
    let failed = hooks.iter().filter(|outcome| outcome.is_failure()).count();

    let enhancements = EnhancementSummary {
        redirected_links: setup_redirects(document, redirect_url),
        lazy_images: setup_lazy_loading(document),
    };

    info!(hooks = hooks.len(), failed, "Components initialized");
    Initialization { hooks, enhancements }
}
