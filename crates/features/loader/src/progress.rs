use crate::document::Document;
use serde::Serialize;
use stager_domain::phase::{Phase, progress_text};
use stager_domain::progress::LoadProgress;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 64;

/// Latest observable loader state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoaderStatus {
    pub phase: Phase,
    pub text: &'static str,
    pub loaded_blocks: usize,
    pub total_blocks: usize,
    pub percent: Option<u8>,
}

impl Default for LoaderStatus {
    fn default() -> Self {
        Self {
            phase: Phase::FetchingConfig,
            text: Phase::FetchingConfig.status_text(),
            loaded_blocks: 0,
            total_blocks: 0,
            percent: None,
        }
    }
}

/// Discrete changes, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PhaseEvent {
    Entered { phase: Phase },
    BlockLoaded { loaded: usize, total: usize, percent: u8 },
}

/// Pushes status and progress text to the document and publishes them to observers.
///
/// Snapshots go to a `watch` channel (latest value), events to a lag-tolerant
/// `broadcast` channel. Publishing never blocks and never fails a run.
#[derive(Debug, Clone)]
pub struct Reporter {
    document: Arc<dyn Document>,
    status: watch::Sender<LoaderStatus>,
    events: broadcast::Sender<Arc<PhaseEvent>>,
}

impl Reporter {
    #[must_use]
    pub fn new(document: Arc<dyn Document>) -> Self {
        let (status, _) = watch::channel(LoaderStatus::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { document, status, events }
    }

    /// Latest-value view of the loader status.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<LoaderStatus> {
        self.status.subscribe()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<PhaseEvent>> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn status(&self) -> LoaderStatus {
        self.status.borrow().clone()
    }

    /// Announces a phase before any of its work starts.
    pub fn enter(&self, phase: Phase) {
        let text = phase.status_text();
        self.document.set_status(text);
        self.status.send_modify(|status| {
            status.phase = phase;
            status.text = text;
        });
        self.publish(PhaseEvent::Entered { phase });
        info!(phase = %phase, "{text}");
    }

    /// Publishes the failed state. The document is left to the failure panel.
    pub fn failed(&self) {
        let phase = Phase::Failed;
        self.status.send_modify(|status| {
            status.phase = phase;
            status.text = phase.status_text();
        });
        self.publish(PhaseEvent::Entered { phase });
    }

    /// Fixes the block total for this run and resets the counter shown to observers.
    ///
    /// An empty layout is complete as soon as it starts.
    pub fn begin_blocks(&self, progress: &LoadProgress) {
        if progress.total_blocks() == 0 {
            self.block_loaded(progress);
            return;
        }
        self.status.send_modify(|status| {
            status.loaded_blocks = progress.loaded_blocks();
            status.total_blocks = progress.total_blocks();
            status.percent = None;
        });
    }

    /// Renders the progress text after a block fetch landed.
    pub fn block_loaded(&self, progress: &LoadProgress) {
        let percent = progress.percent();
        self.document.set_progress(&progress_text(percent));
        self.status.send_modify(|status| {
            status.loaded_blocks = progress.loaded_blocks();
            status.total_blocks = progress.total_blocks();
            status.percent = Some(percent);
        });
        self.publish(PhaseEvent::BlockLoaded {
            loaded: progress.loaded_blocks(),
            total: progress.total_blocks(),
            percent,
        });
        debug!(
            loaded = progress.loaded_blocks(),
            total = progress.total_blocks(),
            percent,
            "Progress"
        );
    }

    /// Starts over from a cold state, as a reload does.
    pub fn reset(&self) {
        self.status.send_replace(LoaderStatus::default());
    }

    fn publish(&self, event: PhaseEvent) {
        // No receivers is fine: nobody is watching this run.
        let _ = self.events.send(Arc::new(event));
    }
}

/// Lag-tolerant receive for [`PhaseEvent`] subscriptions.
pub trait PhaseEventReceiverExt {
    /// Next event, skipping over anything lost to lag. `None` once the reporter is gone.
    fn next_event(&mut self) -> impl Future<Output = Option<Arc<PhaseEvent>>> + Send;
}

impl PhaseEventReceiverExt for broadcast::Receiver<Arc<PhaseEvent>> {
    async fn next_event(&mut self) -> Option<Arc<PhaseEvent>> {
        let mut skipped = 0u64;
        loop {
            match self.recv().await {
                Ok(event) => {
                    if skipped > 0 {
                        warn!(skipped, "Phase event receiver lagged; continuing from latest");
                    }
                    return Some(event);
                },
                Err(broadcast::error::RecvError::Lagged(n)) => skipped = skipped.saturating_add(n),
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
