use std::time::{Duration, Instant};

/// Block-loading progress for one pipeline run.
///
/// `total_blocks` is fixed by [`LoadProgress::fix_total`] once the layout is known;
/// after that only [`LoadProgress::record_block`] moves the counter, and only upward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadProgress {
    loaded_blocks: usize,
    total_blocks: usize,
    started_at: Instant,
}

impl LoadProgress {
    #[must_use]
    pub const fn new(started_at: Instant) -> Self {
        Self { loaded_blocks: 0, total_blocks: 0, started_at }
    }

    /// Sets the denominator and resets the counter.
    pub const fn fix_total(&mut self, total_blocks: usize) {
        self.total_blocks = total_blocks;
        self.loaded_blocks = 0;
    }

    /// Counts one fetched block and returns the new percentage.
    pub fn record_block(&mut self) -> u8 {
        if self.loaded_blocks < self.total_blocks {
            self.loaded_blocks += 1;
        }
        self.percent()
    }

    #[must_use]
    pub const fn loaded_blocks(&self) -> usize {
        self.loaded_blocks
    }

    #[must_use]
    pub const fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    /// `round(loaded / total * 100)`, halves rounding up. An empty layout is complete.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total_blocks == 0 {
            return 100;
        }
        let scaled = (self.loaded_blocks * 200 + self.total_blocks) / (self.total_blocks * 2);
        u8::try_from(scaled.min(100)).unwrap_or(100)
    }

    /// Time since the run started, as seen at `now`.
    #[must_use]
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }
}
