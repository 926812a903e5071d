use crate::document::Document;
use crate::error::LoaderError;
use serde::Serialize;
use stager_domain::manifest::LoaderConfig;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScriptOutcome {
    Loaded { path: String },
    Failed { path: String, error: String },
}

impl ScriptOutcome {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Loaded { path } | Self::Failed { path, .. } => path,
        }
    }
}

/// Attaches scripts one at a time, waiting for each to settle before the next.
///
/// A failed script is logged and the sequence goes on.
pub async fn load_scripts(document: &dyn Document, config: &LoaderConfig) -> Vec<ScriptOutcome> {
    let mut outcomes = Vec::with_capacity(config.scripts.len());

    for path in &config.scripts {
        let outcome = match document.attach_script(&config.asset_url(path)).await {
            Ok(()) => {
                info!(%path, "Script loaded");
                ScriptOutcome::Loaded { path: path.clone() }
            },
            Err(reason) => {
                let err = LoaderError::Script { path: path.clone(), context: Some(reason) };
                error!(%path, error = %err, "Script failed, continuing");
                ScriptOutcome::Failed { path: path.clone(), error: err.to_string() }
            },
        };
        outcomes.push(outcome);
    }

    info!(scripts = outcomes.len(), "All scripts processed");
    outcomes
}
