#![allow(dead_code, unreachable_pub)]

use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::{Value, json};
use stager_domain::config::LoaderSettings;
use stager_fetch::{FetchError, RawResponse, Transport};
use stager_loader::headless::HeadlessDocument;
use stager_loader::{HookRegistry, Pipeline};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const CDN: &str = "https://cdn.test";
pub const CONFIG_URL: &str = "https://cdn.test/config.json";

#[derive(Debug, Clone)]
struct Route {
    response: RawResponse,
    delay: Duration,
}

/// A fake origin: fixed responses per URL, 404 for everything else, and a request log.
#[derive(Debug, Default)]
pub struct Site {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<String>>,
}

impl Site {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, url: &str, response: RawResponse) -> &Self {
        self.routes.lock().insert(url.to_owned(), Route { response, delay: Duration::ZERO });
        self
    }

    pub fn config(&self, config: &Value) -> &Self {
        self.respond(CONFIG_URL, RawResponse::json(config.to_string()))
    }

    /// Serves `body` for `path` under the CDN.
    pub fn asset(&self, path: &str, body: &str) -> &Self {
        self.respond(&format!("{CDN}{path}"), RawResponse::html(body))
    }

    pub fn status(&self, url: &str, status: u16) -> &Self {
        self.respond(url, RawResponse::new(status, Some("text/plain"), ""))
    }

    pub fn delay(&self, url: &str, delay: Duration) -> &Self {
        if let Some(route) = self.routes.lock().get_mut(url) {
            route.delay = delay;
        }
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|requested| *requested == url).count()
    }
}

impl Transport for Site {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<RawResponse, FetchError>> {
        self.requests.lock().push(url.to_owned());
        let route = self.routes.lock().get(url).cloned();
        Box::pin(async move {
            let Some(route) = route else {
                return Ok(RawResponse::new(404, Some("text/plain"), "not found"));
            };
            if !route.delay.is_zero() {
                tokio::time::sleep(route.delay).await;
            }
            Ok(route.response)
        })
    }
}

pub fn url(path: &str) -> String {
    format!("{CDN}{path}")
}

/// One font, two stylesheets, two blocks and two scripts.
pub fn healthy_config() -> Value {
    json!({
        "cdn": CDN,
        "fonts": [{ "name": "Inter", "src": "/fonts/inter.ttf" }],
        "styles": ["/css/base.css", "/css/theme.css"],
        "layout": ["header", "promo"],
        "blocks": { "header": "/blocks/header.html", "promo": "/blocks/promo.html" },
        "scripts": ["/js/x.js", "/js/y.js"]
    })
}

/// Serves [`healthy_config`] and every asset it names.
pub fn healthy_site() -> Arc<Site> {
    let site = Site::new();
    site.config(&healthy_config())
        .asset("/css/base.css", "body{}")
        .asset("/css/theme.css", ":root{}")
        .asset("/blocks/header.html", "<header><h1>Welcome</h1></header>")
        .asset("/blocks/promo.html", r#"<section><a href="/offer">Offer</a></section>"#)
        .asset("/js/x.js", "")
        .asset("/js/y.js", "");
    site
}

pub fn settings() -> LoaderSettings {
    let mut settings = LoaderSettings::default();
    settings.config_url = CONFIG_URL.to_owned();
    settings
}

pub fn document(site: &Arc<Site>) -> HeadlessDocument {
    HeadlessDocument::new(site.clone())
}

pub fn pipeline(site: &Arc<Site>, document: &HeadlessDocument, hooks: HookRegistry) -> Pipeline {
    Pipeline::builder()
        .document(Arc::new(document.clone()))
        .transport(site.clone())
        .settings(settings())
        .hooks(hooks)
        .build()
        .expect("pipeline builds with a document and a transport")
}
