//! # Runtime
//!
//! Runtime profiles for the [Tokio](https://tokio.rs) async runtime.
//!
//! The loading pipeline is written for a single-threaded, cooperative scheduler:
//! fan-out phases interleave futures on one task and never run them in parallel.
//! The [`RuntimeConfig::cooperative`] profile builds exactly that. The
//! multithreaded profile stays available for hosts that embed the loader next
//! to other work.
//!
//! ## Example
//!
//! ```rust,ignore
//! #[stager_runtime::main(cooperative)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use stager_derive::main;

use anyhow::anyhow;
use std::{sync::OnceLock, thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// The default number of worker threads if detection fails.
const DEFAULT_WORKER_THREADS: usize = 4;
/// The default stack size for threads (3 `MiB`).
const DEFAULT_STACK_SIZE: usize = 3 * 1024 * 1024;
/// Minimum allowed stack size (1 `MiB`).
const MIN_STACK_SIZE: usize = 1024 * 1024;
/// Maximum allowed stack size (16 `MiB`).
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;
/// How long an idle blocking thread stays alive.
const THREAD_KEEP_ALIVE: Duration = Duration::from_secs(60);
const DEFAULT_THREAD_NAME: &str = "stager-worker";

static WORKER_THREADS: OnceLock<usize> = OnceLock::new();

fn get_worker_threads() -> usize {
    *WORKER_THREADS.get_or_init(|| {
        std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0 && n <= 1024)
            .unwrap_or_else(|| {
                available_parallelism()
                    .map(std::num::NonZero::get)
                    .unwrap_or(DEFAULT_WORKER_THREADS)
            })
    })
}

/// Scheduler flavor of a runtime profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeFlavor {
    /// Every task is polled on the thread that calls `block_on`.
    CurrentThread,
    /// Work-stealing scheduler over `worker_threads` threads.
    MultiThread,
}

/// Configuration for the Tokio runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub flavor: RuntimeFlavor,
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            flavor: RuntimeFlavor::MultiThread,
            worker_threads: get_worker_threads(),
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            thread_keep_alive: THREAD_KEEP_ALIVE,
        }
    }
}

impl RuntimeConfig {
    /// Single-threaded profile used by the loader binaries.
    #[must_use = "Use this configuration for the cooperative loading pipeline"]
    pub fn cooperative() -> Self {
        Self {
            flavor: RuntimeFlavor::CurrentThread,
            worker_threads: 1,
            stack_size: 2 * 1024 * 1024,
            thread_name: "stager-loop".to_owned(),
            thread_keep_alive: Duration::from_secs(30),
        }
    }

    /// Work-stealing profile for hosts running other workloads next to the loader.
    #[must_use = "Use this configuration when the loader shares the process with other work"]
    pub fn multi_threaded() -> Self {
        Self {
            flavor: RuntimeFlavor::MultiThread,
            worker_threads: get_worker_threads(),
            stack_size: 4 * 1024 * 1024,
            thread_name: "stager-mt".to_owned(),
            thread_keep_alive: Duration::from_secs(300),
        }
    }

    #[must_use = "Customize the number of worker threads for the runtime"]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, 1024);
        self
    }

    #[must_use = "Customize the stack size for worker threads"]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE);
        self
    }

    #[must_use = "Customize the thread name"]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.thread_name =
            if name.trim().is_empty() { DEFAULT_THREAD_NAME.to_owned() } else { name };
        self
    }

    fn normalized(&self) -> Self {
        let worker_threads = match self.flavor {
            RuntimeFlavor::CurrentThread => 1,
            RuntimeFlavor::MultiThread => self.worker_threads.clamp(1, 1024),
        };
        Self {
            flavor: self.flavor,
            worker_threads,
            stack_size: self.stack_size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE),
            thread_name: self.clone().with_thread_name(self.thread_name.clone()).thread_name,
            thread_keep_alive: self.thread_keep_alive,
        }
    }
}

/// Creates a new Tokio runtime from a [`RuntimeConfig`].
///
/// Timers and I/O drivers are always enabled: the fetcher depends on both.
///
/// # Errors
///
/// Returns an [`anyhow::Error`] if the Tokio runtime cannot be created, typically due to
/// OS-level limits on thread creation.
///
/// # Examples
///
/// ```rust
/// use stager_runtime::{build_runtime_with_config, RuntimeConfig};
///
/// let runtime = build_runtime_with_config(&RuntimeConfig::cooperative())?;
/// let answer = runtime.block_on(async { 42 });
/// assert_eq!(answer, 42);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    let config = config.normalized();
    debug!(config = ?config, "Building tokio runtime");

    let mut builder = match config.flavor {
        RuntimeFlavor::CurrentThread => Builder::new_current_thread(),
        RuntimeFlavor::MultiThread => {
            let mut builder = Builder::new_multi_thread();
            builder.worker_threads(config.worker_threads);
            builder
        },
    };

    builder
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive)
        .enable_all();

    builder.build().map_err(|e| anyhow!("Failed to initialize runtime: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_threads_validation() {
        let config = RuntimeConfig::default().with_worker_threads(0);
        assert_eq!(config.worker_threads, 1);

        let config = RuntimeConfig::default().with_worker_threads(2000);
        assert_eq!(config.worker_threads, 1024);
    }

    #[test]
    fn test_stack_size_validation() {
        let config = RuntimeConfig::default().with_stack_size(100);
        assert_eq!(config.stack_size, MIN_STACK_SIZE);

        let config = RuntimeConfig::default().with_stack_size(100 * 1024 * 1024);
        assert_eq!(config.stack_size, MAX_STACK_SIZE);
    }

    #[test]
    fn test_cooperative_profile_is_single_threaded() {
        let config = RuntimeConfig::cooperative().with_worker_threads(8).normalized();
        assert_eq!(config.flavor, RuntimeFlavor::CurrentThread);
        assert_eq!(config.worker_threads, 1);
    }

    #[test]
    fn test_blank_thread_name_falls_back() {
        let config = RuntimeConfig::cooperative().with_thread_name("   ");
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn test_cooperative_runtime_runs_timers() -> Result<()> {
        let runtime = build_runtime_with_config(&RuntimeConfig::cooperative())?;
        let caller = std::thread::current().id();
        let polled_on = runtime.block_on(async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            std::thread::current().id()
        });
        assert_eq!(caller, polled_on);
        Ok(())
    }
}
