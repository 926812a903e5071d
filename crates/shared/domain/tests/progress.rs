use stager_domain::phase::{Phase, progress_text};
use stager_domain::progress::LoadProgress;
use stager_domain::surface::{SurfaceFlags, container_id};
use std::time::{Duration, Instant};

#[test]
fn percent_rounds_against_total() {
    let mut progress = LoadProgress::new(Instant::now());
    progress.fix_total(3);
    assert_eq!(progress.percent(), 0);
    assert_eq!(progress.record_block(), 33);
    assert_eq!(progress.record_block(), 67);
    assert_eq!(progress.loaded_blocks(), 2);
    assert_eq!(progress.total_blocks(), 3);
}

#[test]
fn percent_rounds_halves_up() {
    let mut progress = LoadProgress::new(Instant::now());
    progress.fix_total(8);
    assert_eq!(progress.record_block(), 13);
}

#[test]
fn counter_never_exceeds_total() {
    let mut progress = LoadProgress::new(Instant::now());
    progress.fix_total(1);
    assert_eq!(progress.record_block(), 100);
    assert_eq!(progress.record_block(), 100);
    assert_eq!(progress.loaded_blocks(), 1);
}

#[test]
fn empty_layout_is_complete() {
    let mut progress = LoadProgress::new(Instant::now());
    progress.fix_total(0);
    assert_eq!(progress.percent(), 100);
}

#[test]
fn fixing_total_resets_counter() {
    let start = Instant::now();
    let mut progress = LoadProgress::new(start);
    progress.fix_total(2);
    progress.record_block();
    progress.fix_total(2);
    assert_eq!(progress.loaded_blocks(), 0);
    assert_eq!(progress.elapsed_at(start + Duration::from_millis(1500)), Duration::from_millis(1500));
}

#[test]
fn phases_advance_in_order() {
    let mut walked = vec![Phase::FetchingConfig];
    while let Some(next) = walked.last().and_then(|phase| phase.next()) {
        walked.push(next);
    }

    let mut expected = Phase::SEQUENCE.to_vec();
    expected.push(Phase::Ready);
    assert_eq!(walked, expected);
    assert!(Phase::Failed.next().is_none());
    assert_eq!(Phase::LoadingBlocks.status_text(), "Loading content...");
    assert_eq!(progress_text(67), "Loading... 67%");
}

#[test]
fn surface_helpers() {
    assert_eq!(container_id("header"), "app-header");
    assert!(SurfaceFlags::empty().loader_present());
    assert!(!SurfaceFlags::LOADER_REMOVED.loader_present());
    assert!(SurfaceFlags::REVEALED.contains(SurfaceFlags::APP_VISIBLE));
}
