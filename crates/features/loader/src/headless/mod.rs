//! In-memory [`Document`] host.
//!
//! Stylesheets and scripts are "loaded" by GET-ing them through a [`Transport`] on a
//! spawned task; the completion settles with the outcome. Block markup is kept per
//! container and scanned for links, buttons and lazy images, which can then be
//! clicked and scrolled into view.

mod markup;

use crate::document::{
    Anchor, Button, Completion, Document, ElementId, FailurePanel, LazyImage, LoadResult,
    completion,
};
use crate::enhance::{ButtonInterceptor, ClickDecision, LazyImageObserver};
use markup::{Edit, escape_attr, escape_text, rewrite, scan};
use parking_lot::Mutex;
use serde::Serialize;
use stager_domain::config::SurfaceSettings;
use stager_domain::constants::{LAZY_SOURCE_ATTR, NO_REDIRECT_ATTR};
use stager_domain::phase::{Phase, progress_text};
use stager_domain::surface::{
    APP_SURFACE_ID, LOADER_SURFACE_ID, PROGRESS_NODE_ID, STATUS_NODE_ID, SurfaceFlags,
    container_id,
};
use stager_fetch::{FetchError, Transport};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Stylesheet,
    Script,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResourceState {
    Pending,
    Loaded,
    Failed { reason: String },
}

/// A stylesheet link or script element attached to the head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub url: String,
    pub state: ResourceState,
}

/// Serializable view of everything the document currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceSnapshot {
    pub status: String,
    pub progress: String,
    pub surface: SurfaceFlags,
    pub failure: Option<FailurePanel>,
    pub style_blocks: Vec<String>,
    pub resources: Vec<Resource>,
    /// Container id to its current markup, with rewritten attributes applied.
    pub containers: BTreeMap<String, String>,
    pub navigations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ContainerPolicy {
    /// Any `app-…` id gets a container on first injection.
    OnDemand,
    Declared(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ElementKind {
    Anchor { original: Option<String>, href: Option<String>, no_redirect: bool },
    Button { no_redirect: bool },
    LazyImage { data_src: Option<String>, src: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    container: String,
    /// Index of the element's start tag in the container markup.
    tag: usize,
    kind: ElementKind,
}

#[derive(Debug, Default)]
struct State {
    /// Bumped by [`Document::reset`]; loads started before a reset report into the void.
    generation: u64,
    status: String,
    progress: String,
    surface: SurfaceFlags,
    failure: Option<FailurePanel>,
    style_blocks: Vec<String>,
    resources: Vec<Resource>,
    containers: BTreeMap<String, String>,
    elements: BTreeMap<ElementId, Element>,
    next_element: usize,
    interceptor: Option<Arc<ButtonInterceptor>>,
    observer: Option<Arc<LazyImageObserver>>,
    navigations: Vec<String>,
}

#[derive(Debug)]
struct Inner {
    transport: Arc<dyn Transport>,
    policy: ContainerPolicy,
    state: Mutex<State>,
}

/// Cheap to clone; clones share one document.
#[derive(Debug, Clone)]
pub struct HeadlessDocument {
    inner: Arc<Inner>,
}

impl HeadlessDocument {
    /// A document that creates block containers as blocks arrive.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_policy(transport, ContainerPolicy::OnDemand)
    }

    /// A document with exactly these block containers (by block name).
    #[must_use]
    pub fn with_containers<I, S>(transport: Arc<dyn Transport>, blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = blocks.into_iter().map(|block| container_id(block.as_ref())).collect();
        Self::with_policy(transport, ContainerPolicy::Declared(ids))
    }

    /// Declared containers when the settings list any, on-demand otherwise.
    #[must_use]
    pub fn from_settings(transport: Arc<dyn Transport>, surface: &SurfaceSettings) -> Self {
        if surface.containers.is_empty() {
            Self::new(transport)
        } else {
            Self::with_containers(transport, &surface.containers)
        }
    }

    fn with_policy(transport: Arc<dyn Transport>, policy: ContainerPolicy) -> Self {
        let inner = Inner { transport, policy, state: Mutex::default() };
        let document = Self { inner: Arc::new(inner) };
        document.reset();
        document
    }

    #[must_use]
    pub fn status(&self) -> String {
        self.inner.state.lock().status.clone()
    }

    #[must_use]
    pub fn progress(&self) -> String {
        self.inner.state.lock().progress.clone()
    }

    #[must_use]
    pub fn failure(&self) -> Option<FailurePanel> {
        self.inner.state.lock().failure.clone()
    }

    #[must_use]
    pub fn resources(&self) -> Vec<Resource> {
        self.inner.state.lock().resources.clone()
    }

    #[must_use]
    pub fn style_blocks(&self) -> Vec<String> {
        self.inner.state.lock().style_blocks.clone()
    }

    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.inner.state.lock().navigations.clone()
    }

    /// Current markup of a container, with rewritten attributes applied.
    #[must_use]
    pub fn container_html(&self, id: &str) -> Option<String> {
        let state = self.inner.state.lock();
        render_container(&state, id)
    }

    /// Ids of links, buttons and lazy images whose start tag carries `attr`, in document order.
    #[must_use]
    pub fn find_elements(&self, container: &str, attr: &str) -> Vec<ElementId> {
        let state = self.inner.state.lock();
        let Some(html) = state.containers.get(container) else {
            return Vec::new();
        };
        let tags = scan(html);
        state
            .elements
            .iter()
            .filter(|(_, element)| element.container == container)
            .filter(|(_, element)| tags.get(element.tag).is_some_and(|tag| tag.has(attr)))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Clicks an element. Returns where the click navigates, if anywhere.
    ///
    /// Buttons go through the installed interceptor; links follow their current target.
    pub fn click(&self, id: ElementId) -> Option<String> {
        let (kind, interceptor) = {
            let state = self.inner.state.lock();
            (state.elements.get(&id)?.kind.clone(), state.interceptor.clone())
        };

        let target = match kind {
            ElementKind::Button { no_redirect } => {
                let interceptor = interceptor?;
                match interceptor.on_click(Some(&Button { id, no_redirect })) {
                    ClickDecision::Navigate(url) => Some(url),
                    ClickDecision::PassThrough => None,
                }
            },
            ElementKind::Anchor { href, .. } => href.filter(|href| !href.is_empty()),
            ElementKind::LazyImage { .. } => None,
        }?;

        debug!(element = id.0, %target, "Navigation");
        self.inner.state.lock().navigations.push(target.clone());
        Some(target)
    }

    /// Reports a lazy image as visible. Returns `true` if the observer handled it.
    pub fn scroll_into_view(&self, id: ElementId) -> bool {
        let (image, observer) = {
            let state = self.inner.state.lock();
            let Some(Element { kind: ElementKind::LazyImage { data_src, .. }, .. }) =
                state.elements.get(&id)
            else {
                return false;
            };
            (LazyImage { id, data_src: data_src.clone() }, state.observer.clone())
        };

        observer.is_some_and(|observer| observer.on_visible(self, &image))
    }

    /// Scrolls through the whole page. Returns how many images were seen for the first time.
    pub fn scroll_to_end(&self) -> usize {
        self.lazy_images().into_iter().filter(|image| self.scroll_into_view(image.id)).count()
    }

    #[must_use]
    pub fn snapshot(&self) -> SurfaceSnapshot {
        let state = self.inner.state.lock();
        let containers = state
            .containers
            .keys()
            .filter_map(|id| render_container(&state, id).map(|html| (id.clone(), html)))
            .collect();

        SurfaceSnapshot {
            status: state.status.clone(),
            progress: state.progress.clone(),
            surface: state.surface,
            failure: state.failure.clone(),
            style_blocks: state.style_blocks.clone(),
            resources: state.resources.clone(),
            containers,
            navigations: state.navigations.clone(),
        }
    }

    /// The assembled page as HTML.
    #[must_use]
    pub fn render_page(&self) -> String {
        let snapshot = self.snapshot();
        let mut page = String::from("<!DOCTYPE html>\n<html>\n<head>\n");

        for css in &snapshot.style_blocks {
            let _ = writeln!(page, "<style>\n{css}</style>");
        }
        for resource in &snapshot.resources {
            let url = escape_attr(&resource.url);
            let _ = match resource.kind {
                ResourceKind::Stylesheet => {
                    writeln!(page, "<link rel=\"stylesheet\" href=\"{url}\">")
                },
                ResourceKind::Script => writeln!(page, "<script src=\"{url}\"></script>"),
            };
        }
        page.push_str("</head>\n<body>\n");

        if snapshot.surface.loader_present() {
            let hidden =
                if snapshot.surface.contains(SurfaceFlags::LOADER_HIDDEN) { " hidden" } else { "" };
            let _ = writeln!(page, "<div id=\"{LOADER_SURFACE_ID}\"{hidden}>");
            match &snapshot.failure {
                Some(panel) => {
                    let _ = writeln!(
                        page,
                        "<h2>{}</h2>\n<p>{}</p>\n<p>{}</p>\n<button>{}</button>",
                        escape_text(&panel.title),
                        escape_text(&panel.message),
                        escape_text(&panel.detail),
                        escape_text(&panel.reload_label),
                    );
                },
                None => {
                    let _ = writeln!(
                        page,
                        "<p id=\"{STATUS_NODE_ID}\">{}</p>\n<p id=\"{PROGRESS_NODE_ID}\">{}</p>",
                        escape_text(&snapshot.status),
                        escape_text(&snapshot.progress),
                    );
                },
            }
            page.push_str("</div>\n");
        }

        let visible =
            if snapshot.surface.contains(SurfaceFlags::APP_VISIBLE) { "" } else { " hidden" };
        let _ = writeln!(page, "<div id=\"{APP_SURFACE_ID}\"{visible}>");
        for (id, html) in &snapshot.containers {
            let _ = writeln!(page, "<div id=\"{id}\">{html}</div>");
        }
        page.push_str("</div>\n</body>\n</html>\n");
        page
    }

    fn attach(&self, kind: ResourceKind, url: &str) -> Completion {
        let (handle, completion) = completion();
        let (generation, index) = {
            let mut state = self.inner.state.lock();
            let resource = Resource { kind, url: url.to_owned(), state: ResourceState::Pending };
            state.resources.push(resource);
            (state.generation, state.resources.len() - 1)
        };

        let Ok(runtime) = Handle::try_current() else {
            let result: LoadResult = Err(Cow::Borrowed("no async runtime to load the resource on"));
            self.inner.settle(generation, index, &result);
            handle.settle(result);
            return completion;
        };

        let inner = Arc::clone(&self.inner);
        let url = url.to_owned();
        runtime.spawn(async move {
            let result: LoadResult = match inner.transport.get(&url).await {
                Ok(response) if response.is_success() => Ok(()),
                Ok(response) => {
                    let status = FetchError::Status { status: response.status, context: None };
                    Err(status.to_string().into())
                },
                Err(err) => Err(err.to_string().into()),
            };
            trace!(%url, ?kind, ok = result.is_ok(), "Resource settled");
            inner.settle(generation, index, &result);
            handle.settle(result);
        });

        completion
    }
}

impl Inner {
    fn settle(&self, generation: u64, index: usize, result: &LoadResult) {
        let mut state = self.state.lock();
        if state.generation != generation {
            return;
        }
        if let Some(resource) = state.resources.get_mut(index) {
            resource.state = match result {
                Ok(()) => ResourceState::Loaded,
                Err(reason) => ResourceState::Failed { reason: reason.to_string() },
            };
        }
    }
}

fn render_container(state: &State, id: &str) -> Option<String> {
    let html = state.containers.get(id)?;
    let mut edits = Vec::new();
    for element in state.elements.values().filter(|element| element.container == id) {
        match &element.kind {
            ElementKind::Anchor { original, href: Some(href), .. }
                if original.as_ref() != Some(href) =>
            {
                edits.push(Edit::Set { tag: element.tag, name: "href", value: href.clone() });
            },
            ElementKind::LazyImage { data_src: None, src: Some(src) } => {
                edits.push(Edit::Set { tag: element.tag, name: "src", value: src.clone() });
                edits.push(Edit::Remove { tag: element.tag, name: LAZY_SOURCE_ATTR });
            },
            _ => {},
        }
    }
    Some(if edits.is_empty() { html.clone() } else { rewrite(html, &edits) })
}

impl Document for HeadlessDocument {
    fn set_status(&self, text: &str) {
        let mut state = self.inner.state.lock();
        if state.surface.loader_present() && state.failure.is_none() {
            text.clone_into(&mut state.status);
        }
    }

    fn set_progress(&self, text: &str) {
        let mut state = self.inner.state.lock();
        if state.surface.loader_present() && state.failure.is_none() {
            text.clone_into(&mut state.progress);
        }
    }

    fn inject_style_block(&self, css: &str) {
        self.inner.state.lock().style_blocks.push(css.to_owned());
    }

    fn attach_stylesheet(&self, href: &str) -> Completion {
        self.attach(ResourceKind::Stylesheet, href)
    }

    fn attach_script(&self, src: &str) -> Completion {
        self.attach(ResourceKind::Script, src)
    }

    fn set_container_html(&self, id: &str, html: &str) -> bool {
        let mut state = self.inner.state.lock();
        let known = match &self.inner.policy {
            ContainerPolicy::OnDemand => true,
            ContainerPolicy::Declared(ids) => ids.iter().any(|declared| declared == id),
        };
        if !known {
            return false;
        }

        state.elements.retain(|_, element| element.container != id);
        for (index, tag) in scan(html).iter().enumerate() {
            let kind = match tag.name.as_str() {
                "a" => {
                    let href = tag.value("href").map(str::to_owned);
                    ElementKind::Anchor {
                        original: href.clone(),
                        href,
                        no_redirect: tag.has(NO_REDIRECT_ATTR),
                    }
                },
                "button" => ElementKind::Button { no_redirect: tag.has(NO_REDIRECT_ATTR) },
                "img" if tag.value("loading").is_some_and(|v| v.eq_ignore_ascii_case("lazy")) => {
                    ElementKind::LazyImage {
                        data_src: tag.value(LAZY_SOURCE_ATTR).map(str::to_owned),
                        src: tag.value("src").map(str::to_owned),
                    }
                },
                _ => continue,
            };
            let element_id = ElementId(state.next_element);
            state.next_element += 1;
            let element = Element { container: id.to_owned(), tag: index, kind };
            state.elements.insert(element_id, element);
        }

        state.containers.insert(id.to_owned(), html.to_owned());
        true
    }

    fn anchors(&self) -> Vec<Anchor> {
        let state = self.inner.state.lock();
        state
            .elements
            .iter()
            .filter_map(|(id, element)| match &element.kind {
                ElementKind::Anchor { href, no_redirect, .. } => {
                    Some(Anchor { id: *id, href: href.clone(), no_redirect: *no_redirect })
                },
                _ => None,
            })
            .collect()
    }

    fn set_anchor_href(&self, id: ElementId, url: &str) {
        let mut state = self.inner.state.lock();
        if let Some(Element { kind: ElementKind::Anchor { href, .. }, .. }) =
            state.elements.get_mut(&id)
        {
            *href = Some(url.to_owned());
        }
    }

    fn intercept_buttons(&self, interceptor: Arc<ButtonInterceptor>) {
        self.inner.state.lock().interceptor = Some(interceptor);
    }

    fn lazy_images(&self) -> Vec<LazyImage> {
        let state = self.inner.state.lock();
        state
            .elements
            .iter()
            .filter_map(|(id, element)| match &element.kind {
                ElementKind::LazyImage { data_src, .. } => {
                    Some(LazyImage { id: *id, data_src: data_src.clone() })
                },
                _ => None,
            })
            .collect()
    }

    fn set_image_source(&self, id: ElementId, url: &str) {
        let mut state = self.inner.state.lock();
        if let Some(Element { kind: ElementKind::LazyImage { data_src, src }, .. }) =
            state.elements.get_mut(&id)
        {
            *src = Some(url.to_owned());
            *data_src = None;
        }
    }

    fn observe_viewport(&self, observer: Arc<LazyImageObserver>) {
        self.inner.state.lock().observer = Some(observer);
    }

    fn hide_loader(&self) {
        self.inner.state.lock().surface.insert(SurfaceFlags::LOADER_HIDDEN);
    }

    fn reveal_app(&self) {
        self.inner.state.lock().surface.insert(SurfaceFlags::APP_VISIBLE);
    }

    fn remove_loader(&self) {
        self.inner.state.lock().surface.insert(SurfaceFlags::LOADER_REMOVED);
    }

    fn show_failure(&self, panel: &FailurePanel) {
        let mut state = self.inner.state.lock();
        state.failure = Some(panel.clone());
        state.surface.insert(SurfaceFlags::FAILURE_SHOWN);
    }

    fn surface(&self) -> SurfaceFlags {
        self.inner.state.lock().surface
    }

    fn reset(&self) {
        let mut state = self.inner.state.lock();
        let generation = state.generation + 1;
        *state = State {
            generation,
            status: Phase::FetchingConfig.status_text().to_owned(),
            progress: progress_text(0),
            ..State::default()
        };
        if let ContainerPolicy::Declared(ids) = &self.inner.policy {
            state.containers = ids.iter().map(|id| (id.clone(), String::new())).collect();
        }
    }
}
