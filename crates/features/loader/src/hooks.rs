//! Initialization hooks: a fixed, ordered set of optional named callbacks.

use crate::error::LoaderError;
use serde::Serialize;
use stager_domain::constants::HOOK_NAMES;
use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info};

pub type HookResult = Result<(), Box<dyn StdError + Send + Sync>>;

type HookFn = Arc<dyn Fn() -> HookResult + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookName {
    InitHeader,
    InitAccordion,
    InitSwiper,
    InitLang,
    InitDrawer,
    InitArticles,
    InitTextBlock,
    InitTextDefence,
}

impl HookName {
    /// Dispatch order.
    pub const ALL: [Self; 8] = [
        Self::InitHeader,
        Self::InitAccordion,
        Self::InitSwiper,
        Self::InitLang,
        Self::InitDrawer,
        Self::InitArticles,
        Self::InitTextBlock,
        Self::InitTextDefence,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        HOOK_NAMES[self as usize]
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookName {
    type Err = LoaderError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|hook| hook.as_str() == name).ok_or_else(|| {
            LoaderError::UnknownHook { name: name.to_owned(), context: None }
        })
    }
}

/// What dispatching one hook did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HookOutcome {
    /// No function registered under this name.
    Absent { hook: &'static str },
    Completed { hook: &'static str },
    Failed { hook: &'static str, error: String },
    Panicked { hook: &'static str, message: String },
}

impl HookOutcome {
    #[must_use]
    pub const fn hook(&self) -> &'static str {
        match self {
            Self::Absent { hook }
            | Self::Completed { hook }
            | Self::Failed { hook, .. }
            | Self::Panicked { hook, .. } => hook,
        }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Panicked { .. })
    }
}

/// Fixed name to optional function slot. Cheap to clone; slots are shared.
#[derive(Clone, Default)]
pub struct HookRegistry {
    slots: [Option<HookFn>; 8],
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registered: Vec<&str> =
            HookName::ALL.iter().filter(|h| self.is_registered(**h)).map(|h| h.as_str()).collect();
        f.debug_struct("HookRegistry").field("registered", &registered).finish()
    }
}

impl HookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills (or replaces) a slot.
    pub fn register<F>(&mut self, hook: HookName, f: F) -> &mut Self
    where
        F: Fn() -> HookResult + Send + Sync + 'static,
    {
        self.slots[hook as usize] = Some(Arc::new(f));
        self
    }

    /// Fills a slot by its published name.
    ///
    /// # Errors
    /// Returns [`LoaderError::UnknownHook`] for names outside the fixed list.
    pub fn register_named<F>(&mut self, name: &str, f: F) -> Result<&mut Self, LoaderError>
    where
        F: Fn() -> HookResult + Send + Sync + 'static,
    {
        let hook = name.parse::<HookName>()?;
        Ok(self.register(hook, f))
    }

    pub fn clear(&mut self, hook: HookName) -> &mut Self {
        self.slots[hook as usize] = None;
        self
    }

    #[must_use]
    pub fn is_registered(&self, hook: HookName) -> bool {
        self.slots[hook as usize].is_some()
    }

    /// Runs every registered hook in order. A hook that errors or panics only ends itself.
    pub fn dispatch(&self) -> Vec<HookOutcome> {
        HookName::ALL.iter().map(|hook| self.dispatch_one(*hook)).collect()
    }

    fn dispatch_one(&self, hook: HookName) -> HookOutcome {
        let name = hook.as_str();
        let Some(f) = &self.slots[hook as usize] else {
            debug!(hook = name, "Hook not registered");
            return HookOutcome::Absent { hook: name };
        };

        match catch_unwind(AssertUnwindSafe(|| f())) {
            Ok(Ok(())) => {
                info!(hook = name, "Hook completed");
                HookOutcome::Completed { hook: name }
            },
            Ok(Err(err)) => {
                error!(hook = name, error = %err, "Hook failed");
                HookOutcome::Failed { hook: name, error: err.to_string() }
            },
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(hook = name, %message, "Hook panicked");
                HookOutcome::Panicked { hook: name, message }
            },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}
