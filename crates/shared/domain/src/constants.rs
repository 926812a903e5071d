/// Remote configuration document fetched when no settings override it.
pub const DEFAULT_CONFIG_URL: &str =
    "https://cdn.jsdelivr.net/gh/stager-sites/stager-cdn@main/config.json";

/// Where links and buttons are sent when the configuration has no `redirectUrl`.
pub const DEFAULT_REDIRECT_URL: &str = "/gotosite.html";

/// Elements carrying this attribute keep their own navigation.
pub const NO_REDIRECT_ATTR: &str = "data-no-redirect";

/// Attribute holding the deferred source of a lazy image.
pub const LAZY_SOURCE_ATTR: &str = "data-src";

/// Per-attempt fetch timeout.
pub const FETCH_TIMEOUT_MS: u64 = 15_000;
pub const FETCH_MAX_ATTEMPTS: u32 = 3;
/// Linear backoff step: the wait after failed attempt `i` (0-based) is `step * (i + 1)`.
pub const FETCH_BACKOFF_STEP_MS: u64 = 1_000;

/// Pause before initialization hooks run, letting freshly attached scripts settle.
pub const SETTLE_DELAY_MS: u64 = 200;
pub const REVEAL_DELAY_MS: u64 = 300;
pub const REMOVAL_DELAY_MS: u64 = 500;

/// Initialization hooks, in dispatch order.
pub const HOOK_NAMES: [&str; 8] = [
    "initHeader",
    "initAccordion",
    "initSwiper",
    "initLang",
    "initDrawer",
    "initArticles",
    "initTextBlock",
    "initTextDefence",
];

pub const FAILURE_TITLE: &str = "Loading error";
pub const FAILURE_MESSAGE: &str =
    "Failed to load the site. Check your internet connection and try again.";
pub const UNKNOWN_ERROR: &str = "Unknown error";
pub const RELOAD_LABEL: &str = "Reload page";
