use futures::FutureExt;
use futures::future::{BoxFuture, pending};
use stager_fetch::{Content, FetchError, RawResponse, RetryPolicy, RetryingFetcher, Transport};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
enum Step {
    Respond(RawResponse),
    Refuse,
    Break,
    Hang,
}

/// Answers attempt `n` (1-based) with `script(n)` and counts attempts.
struct Scripted<F> {
    script: F,
    calls: AtomicUsize,
}

impl<F> std::fmt::Debug for Scripted<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scripted").field("calls", &self.calls).finish_non_exhaustive()
    }
}

impl<F> Scripted<F>
where
    F: Fn(usize) -> Step + Send + Sync + 'static,
{
    fn new(script: F) -> Arc<Self> {
        Arc::new(Self { script, calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> Transport for Scripted<F>
where
    F: Fn(usize) -> Step + Send + Sync + 'static,
{
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<RawResponse, FetchError>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match (self.script)(n) {
            Step::Respond(response) => futures::future::ready(Ok(response)).boxed(),
            Step::Refuse => futures::future::ready(Err(FetchError::Connection {
                message: format!("refused on attempt {n}").into(),
                context: Some(url.to_owned().into()),
            }))
            .boxed(),
            Step::Break => futures::future::ready(Err(FetchError::Internal {
                message: "transport is shut down".into(),
                context: Some(url.to_owned().into()),
            }))
            .boxed(),
            Step::Hang => pending().boxed(),
        }
    }
}

fn fetcher(transport: Arc<dyn Transport>) -> RetryingFetcher {
    RetryingFetcher::new(transport, RetryPolicy::default())
}

#[tokio::test(start_paused = true)]
async fn always_failing_fetch_uses_whole_budget() {
    let transport = Scripted::new(|_| Step::Respond(RawResponse::new(500, None, "")));
    let fetcher = fetcher(transport.clone());
    let started = Instant::now();

    let err = fetcher.fetch_with_attempts("https://cdn.test/a", 3).await.err();

    assert!(matches!(err, Some(FetchError::Status { status: 500, .. })));
    assert_eq!(transport.calls(), 3);
    assert_eq!(started.elapsed(), Duration::from_millis(3_000));
}

#[tokio::test(start_paused = true)]
async fn backoff_total_grows_with_budget() {
    let transport = Scripted::new(|_| Step::Refuse);
    let fetcher = fetcher(transport.clone());
    let started = Instant::now();

    let err = fetcher.fetch_with_attempts("https://cdn.test/a", 4).await.err();

    assert_eq!(transport.calls(), 4);
    assert_eq!(started.elapsed(), RetryPolicy::default().total_backoff(4));
    assert_eq!(started.elapsed(), Duration::from_millis(6_000));
    let message = err.map(|e| e.to_string()).unwrap_or_default();
    assert!(message.contains("refused on attempt 4"), "last error wins: {message}");
}

#[tokio::test(start_paused = true)]
async fn success_on_attempt_k_stops_there() -> Result<(), FetchError> {
    let transport = Scripted::new(|n| {
        if n < 2 { Step::Refuse } else { Step::Respond(RawResponse::json(r#"{"cdn":"x"}"#)) }
    });
    let fetcher = fetcher(transport.clone());
    let started = Instant::now();

    let content = fetcher.fetch_with_attempts("https://cdn.test/config.json", 3).await?;

    assert!(content.is_document());
    assert_eq!(transport.calls(), 2);
    assert_eq!(started.elapsed(), Duration::from_millis(1_000));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn timed_out_attempt_counts_as_failure() -> Result<(), FetchError> {
    let transport = Scripted::new(|n| {
        if n == 1 { Step::Hang } else { Step::Respond(RawResponse::html("<b/>")) }
    });
    let fetcher = fetcher(transport.clone());
    let started = Instant::now();

    let content = fetcher.fetch("https://cdn.test/block.html").await?;

    assert_eq!(content, Content::Text("<b/>".to_owned()));
    assert_eq!(transport.calls(), 2);
    assert_eq!(started.elapsed(), Duration::from_millis(15_000 + 1_000));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn exhausted_by_timeouts_reports_timeout() {
    let transport = Scripted::new(|_| Step::Hang);
    let policy = RetryPolicy::default().with_timeout(Duration::from_millis(50));
    let fetcher = RetryingFetcher::new(transport.clone(), policy);

    let err = fetcher.fetch_with_attempts("https://cdn.test/slow", 2).await.err();

    assert!(matches!(err, Some(FetchError::Timeout { timeout_ms: 50, .. })));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn declared_json_that_does_not_parse_is_retried() {
    let transport = Scripted::new(|_| Step::Respond(RawResponse::json("{not json")));
    let fetcher = fetcher(transport.clone());

    let err = fetcher.fetch_with_attempts("https://cdn.test/config.json", 2).await.err();

    assert!(matches!(err, Some(FetchError::Decode { .. })));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn invalid_requests_never_reach_the_transport() {
    let transport = Scripted::new(|_| Step::Respond(RawResponse::html("")));
    let fetcher = fetcher(transport.clone());

    let empty_url = fetcher.fetch("   ").await.err();
    let zero_attempts = fetcher.fetch_with_attempts("https://cdn.test/a", 0).await.err();

    assert!(matches!(empty_url, Some(FetchError::InvalidRequest { .. })));
    assert!(matches!(zero_attempts, Some(FetchError::InvalidRequest { .. })));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn internal_errors_are_not_retried() {
    let transport = Scripted::new(|_| Step::Break);
    let fetcher = fetcher(transport.clone());
    let started = Instant::now();

    let err = fetcher.fetch_with_attempts("https://cdn.test/a", 3).await.err();

    assert!(matches!(err, Some(FetchError::Internal { .. })));
    assert_eq!(transport.calls(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}
