use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use futures::future::BoxFuture;
use serde_json::json;
use stager_domain::config::LoaderSettings;
use stager_domain::manifest::{FontSpec, LoaderConfig};
use stager_fetch::{FetchError, RawResponse, Transport};
use stager_loader::assets::font_face_css;
use stager_loader::headless::HeadlessDocument;
use stager_loader::{HookRegistry, Pipeline};
use std::hint::black_box;
use std::sync::Arc;

const CONFIG_URL: &str = "https://cdn.bench/config.json";
const FRAGMENT: &str =
    r#"<section><a href="/next">Next</a><img loading="lazy" data-src="/i.png"></section>"#;

/// Serves a config with `blocks` blocks; every other URL is a small HTML fragment.
#[derive(Debug)]
struct InMemory {
    config: String,
}

impl InMemory {
    fn new(blocks: usize) -> Arc<Self> {
        let layout: Vec<String> = (0..blocks).map(|i| format!("block{i}")).collect();
        let paths: serde_json::Map<String, serde_json::Value> = layout
            .iter()
            .map(|name| (name.clone(), json!(format!("/blocks/{name}.html"))))
            .collect();
        let config = json!({
            "cdn": "https://cdn.bench",
            "styles": ["/css/a.css", "/css/b.css"],
            "layout": layout,
            "blocks": paths,
            "scripts": ["/js/app.js"]
        });
        Arc::new(Self { config: config.to_string() })
    }
}

impl Transport for InMemory {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<RawResponse, FetchError>> {
        let response = if url == CONFIG_URL {
            RawResponse::json(self.config.clone())
        } else {
            RawResponse::html(FRAGMENT)
        };
        Box::pin(async move { Ok(response) })
    }
}

fn instant_settings() -> LoaderSettings {
    let mut settings = LoaderSettings::default();
    settings.config_url = CONFIG_URL.to_owned();
    settings.timing.settle_delay_ms = 0;
    settings.timing.reveal_delay_ms = 0;
    settings.timing.removal_delay_ms = 0;
    settings
}

// ============================================================================
// Benchmark: Full Pipeline Run
// ============================================================================

fn bench_pipeline_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_run");
    let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();

    for blocks in [1_usize, 10, 50] {
        let transport = InMemory::new(blocks);
        group.throughput(Throughput::Elements(u64::try_from(blocks).unwrap_or(u64::MAX)));

        group.bench_with_input(BenchmarkId::new("blocks", blocks), &transport, |b, transport| {
            b.to_async(&rt).iter(|| async {
                let document = HeadlessDocument::new(transport.clone());
                let mut pipeline = Pipeline::builder()
                    .document(Arc::new(document))
                    .transport(transport.clone())
                    .settings(instant_settings())
                    .hooks(HookRegistry::new())
                    .build()
                    .unwrap();
                black_box(pipeline.run().await);
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Font Rule Generation
// ============================================================================

fn bench_font_faces(c: &mut Criterion) {
    let mut config = LoaderConfig::new("https://cdn.bench");
    config.fonts = (0..16)
        .map(|i| FontSpec {
            name: format!("Family{}", i % 4),
            src: format!("/fonts/{i}.ttf"),
            weight: Some(((i % 9 + 1) * 100).to_string()),
            style: None,
        })
        .collect();

    c.bench_function("font_face_css_16", |b| {
        b.iter(|| black_box(font_face_css(black_box(&config))));
    });
}

criterion_group!(benches, bench_pipeline_run, bench_font_faces);
criterion_main!(benches);
