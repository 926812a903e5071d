use crate::document::{Document, FailurePanel};
use crate::error::LoaderError;
use crate::progress::Reporter;
use serde::Serialize;
use stager_domain::config::TimingSettings;
use stager_domain::phase::Phase;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TerminalState {
    Ready {
        #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
        elapsed: Duration,
    },
    Failed {
        detail: String,
    },
}

impl TerminalState {
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Ready { .. } => Phase::Ready,
            Self::Failed { .. } => Phase::Failed,
        }
    }
}

fn as_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

/// Drives the document into its final state. One controller per run; it settles once.
#[derive(Debug)]
pub struct TerminalController {
    document: Arc<dyn Document>,
    reporter: Reporter,
    timing: TimingSettings,
    settled: AtomicBool,
}

impl TerminalController {
    #[must_use]
    pub fn new(document: Arc<dyn Document>, reporter: Reporter, timing: TimingSettings) -> Self {
        Self { document, reporter, timing, settled: AtomicBool::new(false) }
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }

    /// Announces readiness, then hides and finally removes the loader surface.
    ///
    /// `elapsed` is measured by the caller when the run finished its work; the reveal
    /// delays are not part of it.
    ///
    /// # Errors
    /// Returns [`LoaderError::Internal`] if the run has already settled.
    pub async fn succeed(&self, elapsed: Duration) -> Result<TerminalState, LoaderError> {
        self.claim()?;

        self.reporter.enter(Phase::Ready);
        info!(elapsed_ms = elapsed.as_millis(), "Site loaded in {:.2}s", elapsed.as_secs_f64());

        tokio::time::sleep(self.timing.reveal_delay()).await;
        self.document.hide_loader();
        self.document.reveal_app();

        tokio::time::sleep(self.timing.removal_delay()).await;
        self.document.remove_loader();

        Ok(TerminalState::Ready { elapsed })
    }

    /// Replaces the loader surface with the failure panel.
    ///
    /// # Errors
    /// Returns [`LoaderError::Internal`] if the run has already settled.
    pub fn fail(&self, cause: &LoaderError) -> Result<TerminalState, LoaderError> {
        self.claim()?;

        let panel = FailurePanel::new(Some(&cause.user_message()));
        error!(error = %cause, "Critical error, loading aborted");
        self.document.show_failure(&panel);
        self.reporter.failed();

        Ok(TerminalState::Failed { detail: panel.detail })
    }

    fn claim(&self) -> Result<(), LoaderError> {
        if self.settled.swap(true, Ordering::AcqRel) {
            return Err("terminal state already reached".into());
        }
        Ok(())
    }
}
