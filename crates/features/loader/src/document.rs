//! The presentation surface the pipeline drives.
//!
//! A [`Document`] owns two surfaces (the loader and the application), the block
//! containers inside the application surface, and whatever resources get attached
//! to it. Resource loads report back through single-shot [`Completion`]s.

use crate::enhance::{ButtonInterceptor, LazyImageObserver};
use serde::Serialize;
use stager_domain::constants::{FAILURE_MESSAGE, FAILURE_TITLE, RELOAD_LABEL, UNKNOWN_ERROR};
use stager_domain::surface::SurfaceFlags;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Outcome of one resource load. The error carries a human-readable reason.
pub type LoadResult = Result<(), Cow<'static, str>>;

/// Creates a linked pair: the document keeps the handle, the loader awaits the completion.
#[must_use]
pub fn completion() -> (CompletionHandle, Completion) {
    let (tx, rx) = oneshot::channel();
    (CompletionHandle { tx }, Completion { rx })
}

/// Settles a [`Completion`]. Consumed on use, so a load settles at most once.
#[derive(Debug)]
pub struct CompletionHandle {
    tx: oneshot::Sender<LoadResult>,
}

impl CompletionHandle {
    pub fn resolve(self) {
        let _ = self.tx.send(Ok(()));
    }

    pub fn reject(self, reason: impl Into<Cow<'static, str>>) {
        let _ = self.tx.send(Err(reason.into()));
    }

    pub fn settle(self, result: LoadResult) {
        let _ = self.tx.send(result);
    }
}

/// Awaitable load event of an attached resource.
///
/// A handle dropped without settling rejects the completion.
#[derive(Debug)]
#[must_use = "A completion does nothing unless awaited"]
pub struct Completion {
    rx: oneshot::Receiver<LoadResult>,
}

impl Completion {
    pub fn resolved() -> Self {
        let (handle, completion) = completion();
        handle.resolve();
        completion
    }

    pub fn rejected(reason: impl Into<Cow<'static, str>>) -> Self {
        let (handle, completion) = completion();
        handle.reject(reason);
        completion
    }
}

impl Future for Completion {
    type Output = LoadResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|settled| settled.unwrap_or_else(|_| Err(Cow::Borrowed("load abandoned"))))
    }
}

/// Identity of an element within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub id: ElementId,
    pub href: Option<String>,
    pub no_redirect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub id: ElementId,
    pub no_redirect: bool,
}

/// An image flagged `loading="lazy"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyImage {
    pub id: ElementId,
    pub data_src: Option<String>,
}

/// Diagnostic content that replaces the loader surface when a run fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailurePanel {
    pub title: String,
    pub message: String,
    pub detail: String,
    pub reload_label: String,
}

impl FailurePanel {
    #[must_use]
    pub fn new(detail: Option<&str>) -> Self {
        let detail = detail.map(str::trim).filter(|d| !d.is_empty()).unwrap_or(UNKNOWN_ERROR);
        Self {
            title: FAILURE_TITLE.to_owned(),
            message: FAILURE_MESSAGE.to_owned(),
            detail: detail.to_owned(),
            reload_label: RELOAD_LABEL.to_owned(),
        }
    }
}

/// The surface a pipeline run renders into.
///
/// Methods take `&self`; implementations synchronize internally. None of them may
/// call back into the pipeline.
pub trait Document: Send + Sync + fmt::Debug {
    /// Text of the loader's status node. Ignored once the loader surface is removed.
    fn set_status(&self, text: &str);
    /// Text of the loader's progress node.
    fn set_progress(&self, text: &str);

    /// Appends an inline style block to the document head.
    fn inject_style_block(&self, css: &str);
    /// Attaches a stylesheet link and starts loading it.
    fn attach_stylesheet(&self, href: &str) -> Completion;
    /// Attaches a script element and starts loading it.
    fn attach_script(&self, src: &str) -> Completion;

    /// Replaces the markup of container `id`. Returns `false` when there is no such container.
    fn set_container_html(&self, id: &str, html: &str) -> bool;

    fn anchors(&self) -> Vec<Anchor>;
    fn set_anchor_href(&self, id: ElementId, href: &str);
    /// Routes every click on a button through `interceptor`.
    fn intercept_buttons(&self, interceptor: Arc<ButtonInterceptor>);

    fn lazy_images(&self) -> Vec<LazyImage>;
    /// Sets `src` and drops the deferred source attribute.
    fn set_image_source(&self, id: ElementId, src: &str);
    /// Reports images entering the viewport to `observer`.
    fn observe_viewport(&self, observer: Arc<LazyImageObserver>);

    fn hide_loader(&self);
    fn reveal_app(&self);
    fn remove_loader(&self);
    fn show_failure(&self, panel: &FailurePanel);
    fn surface(&self) -> SurfaceFlags;

    /// Returns the document to its pristine state, as a page reload would.
    fn reset(&self);
}
