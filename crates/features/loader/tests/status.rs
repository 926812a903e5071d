mod support;

use stager_domain::phase::Phase;
use stager_loader::{HookRegistry, PhaseEvent, PhaseEventReceiverExt};
use std::time::Duration;
use support::{CONFIG_URL, document, healthy_site, pipeline, url};

#[tokio::test(start_paused = true)]
async fn events_follow_phase_order() {
    let site = healthy_site();
    let doc = document(&site);
    let mut pipeline = pipeline(&site, &doc, HookRegistry::new());
    let mut events = pipeline.subscribe();

    pipeline.run().await;
    drop(pipeline);

    let mut seen = Vec::new();
    while let Some(event) = events.next_event().await {
        seen.push((*event).clone());
    }

    let entered: Vec<Phase> = seen
        .iter()
        .filter_map(|event| match event {
            PhaseEvent::Entered { phase } => Some(*phase),
            PhaseEvent::BlockLoaded { .. } => None,
        })
        .collect();
    let mut expected = Phase::SEQUENCE.to_vec();
    expected.push(Phase::Ready);
    assert_eq!(entered, expected);

    let blocks: Vec<&PhaseEvent> =
        seen.iter().filter(|event| matches!(event, PhaseEvent::BlockLoaded { .. })).collect();
    assert_eq!(
        blocks,
        [
            &PhaseEvent::BlockLoaded { loaded: 1, total: 2, percent: 50 },
            &PhaseEvent::BlockLoaded { loaded: 2, total: 2, percent: 100 },
        ]
    );

    let first_block = seen.iter().position(|e| matches!(e, PhaseEvent::BlockLoaded { .. }));
    let scripts_entered = PhaseEvent::Entered { phase: Phase::LoadingScripts };
    let scripts = seen.iter().position(|e| *e == scripts_entered);
    assert!(first_block < scripts);
}

#[tokio::test(start_paused = true)]
async fn watch_tracks_latest_status() {
    let site = healthy_site();
    site.delay(CONFIG_URL, Duration::from_millis(100));
    site.delay(&url("/blocks/promo.html"), Duration::from_millis(1_000));
    let doc = document(&site);
    let mut pipeline = pipeline(&site, &doc, HookRegistry::new());
    let status = pipeline.watch();

    let observer = tokio::spawn(async move {
        let mut status = status;
        let mut halfway = None;
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            if current.percent == Some(50) {
                halfway = Some(current.clone());
            }
            if current.phase == Phase::Ready {
                return (halfway, current);
            }
        }
        (halfway, status.borrow().clone())
    });

    pipeline.run().await;
    let (halfway, last) = observer.await.expect("observer task completes");

    let halfway = halfway.expect("status observed at half progress");
    assert_eq!(halfway.phase, Phase::LoadingBlocks);
    assert_eq!(halfway.text, "Loading content...");
    assert_eq!((halfway.loaded_blocks, halfway.total_blocks), (1, 2));

    assert_eq!(last.phase, Phase::Ready);
    assert_eq!(last.text, "Ready!");
    assert_eq!(last.percent, Some(100));
}

#[tokio::test(start_paused = true)]
async fn failed_run_publishes_failed_status() {
    let site = healthy_site();
    site.status(&url("/css/base.css"), 500);
    let doc = document(&site);
    let mut pipeline = pipeline(&site, &doc, HookRegistry::new());

    pipeline.run().await;

    let status = pipeline.watch().borrow().clone();
    assert_eq!(status.phase, Phase::Failed);
    assert_eq!(status.text, "Loading error");
    assert_eq!(status.percent, None);
}
