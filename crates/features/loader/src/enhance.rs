//! Post-load document enhancements: link redirects, button interception, lazy images.

use crate::document::{Button, Document, ElementId, LazyImage};
use fxhash::FxHashSet;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

/// Whether a link with this `href` gets pointed at the redirect URL.
///
/// Empty links, in-page anchors, absolute `http…` links and opted-out elements keep
/// their target.
#[must_use]
pub fn should_redirect(href: Option<&str>, no_redirect: bool) -> bool {
    match href {
        None => false,
        Some(href) => {
            !(href.is_empty() || href.starts_with('#') || href.starts_with("http") || no_redirect)
        },
    }
}

/// Click routing decision for a click that landed on (or inside) a button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickDecision {
    /// Default action suppressed; navigate here instead.
    Navigate(String),
    PassThrough,
}

/// Sends clicks on buttons without the opt-out marker to the redirect URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonInterceptor {
    redirect_url: String,
}

impl ButtonInterceptor {
    #[must_use]
    pub fn new(redirect_url: impl Into<String>) -> Self {
        Self { redirect_url: redirect_url.into() }
    }

    #[must_use]
    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }

    /// `button` is the closest button around the click target, if any.
    #[must_use]
    pub fn on_click(&self, button: Option<&Button>) -> ClickDecision {
        match button {
            Some(button) if !button.no_redirect => {
                debug!(button = button.id.0, url = %self.redirect_url, "Button click redirected");
                ClickDecision::Navigate(self.redirect_url.clone())
            },
            _ => ClickDecision::PassThrough,
        }
    }
}

/// Swaps deferred sources into lazy images the first time each one becomes visible.
#[derive(Debug, Default)]
pub struct LazyImageObserver {
    observed: Mutex<FxHashSet<ElementId>>,
}

impl LazyImageObserver {
    #[must_use]
    pub fn new(images: &[LazyImage]) -> Self {
        Self { observed: Mutex::new(images.iter().map(|image| image.id).collect()) }
    }

    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.observed.lock().len()
    }

    #[must_use]
    pub fn is_observed(&self, id: ElementId) -> bool {
        self.observed.lock().contains(&id)
    }

    /// Handles a visibility report. Returns `true` when `image` was still observed.
    ///
    /// The image stops being observed whether or not it had a deferred source.
    pub fn on_visible(&self, document: &dyn Document, image: &LazyImage) -> bool {
        if !self.observed.lock().remove(&image.id) {
            return false;
        }
        if let Some(src) = image.data_src.as_deref() {
            document.set_image_source(image.id, src);
            debug!(image = image.id.0, %src, "Lazy image loaded");
        }
        true
    }
}

/// What [`setup_redirects`] and [`setup_lazy_loading`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct EnhancementSummary {
    pub redirected_links: usize,
    pub lazy_images: usize,
}

/// Points eligible links at `redirect_url` and installs button interception.
/// Returns the number of rewritten links.
pub fn setup_redirects(document: &dyn Document, redirect_url: &str) -> usize {
    let mut rewritten = 0;
    for anchor in document.anchors() {
        if should_redirect(anchor.href.as_deref(), anchor.no_redirect) {
            document.set_anchor_href(anchor.id, redirect_url);
            rewritten += 1;
        }
    }

    document.intercept_buttons(Arc::new(ButtonInterceptor::new(redirect_url)));
    info!(links = rewritten, %redirect_url, "Redirects configured");
    rewritten
}

/// Starts observing every lazy image. Returns how many are observed.
pub fn setup_lazy_loading(document: &dyn Document) -> usize {
    let images = document.lazy_images();
    let observer = Arc::new(LazyImageObserver::new(&images));
    let count = observer.observed_count();
    document.observe_viewport(observer);
    info!(images = count, "Lazy loading configured");
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_policy() {
        assert!(should_redirect(Some("/about"), false));
        assert!(should_redirect(Some("promo.html"), false));
        assert!(!should_redirect(Some("/about"), true));
        assert!(!should_redirect(Some(""), false));
        assert!(!should_redirect(None, false));
        assert!(!should_redirect(Some("#faq"), false));
        assert!(!should_redirect(Some("https://partner.test"), false));
        assert!(!should_redirect(Some("http://partner.test"), false));
    }

    #[test]
    fn test_button_interception() {
        let interceptor = ButtonInterceptor::new("/gotosite.html");
        let plain = Button { id: ElementId(1), no_redirect: false };
        let opted_out = Button { id: ElementId(2), no_redirect: true };

        assert_eq!(
            interceptor.on_click(Some(&plain)),
            ClickDecision::Navigate("/gotosite.html".into())
        );
        assert_eq!(interceptor.on_click(Some(&opted_out)), ClickDecision::PassThrough);
        assert_eq!(interceptor.on_click(None), ClickDecision::PassThrough);
    }
}
