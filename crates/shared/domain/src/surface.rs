use bitflags::bitflags;
use serde::{Deserialize, Serialize};

pub const LOADER_SURFACE_ID: &str = "siteLoader";
pub const STATUS_NODE_ID: &str = "loaderStatus";
pub const PROGRESS_NODE_ID: &str = "loaderText";
pub const APP_SURFACE_ID: &str = "app";
pub const CONTAINER_PREFIX: &str = "app-";

/// Id of the container a block's markup is injected into.
#[must_use]
pub fn container_id(block: &str) -> String {
    format!("{CONTAINER_PREFIX}{block}")
}

bitflags! {
    /// Visibility state of the two surfaces.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SurfaceFlags: u8 {
        const LOADER_HIDDEN = 1 << 0;
        const APP_VISIBLE = 1 << 1;
        const LOADER_REMOVED = 1 << 2;
        /// The loader surface shows the failure panel.
        const FAILURE_SHOWN = 1 << 3;

        const REVEALED = Self::LOADER_HIDDEN.bits() | Self::APP_VISIBLE.bits();
    }
}

impl SurfaceFlags {
    /// Whether the loading surface still accepts status and progress text.
    #[must_use]
    pub const fn loader_present(self) -> bool {
        !self.contains(Self::LOADER_REMOVED)
    }
}
