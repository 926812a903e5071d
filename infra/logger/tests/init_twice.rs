use stager_logger::{LevelFilter, Logger, LoggerError};

#[test]
fn second_init_reports_subscriber_error() {
    let logger = Logger::builder()
        .name("stager-init-twice")
        .level(LevelFilter::INFO)
        .init()
        .expect("first init should succeed");
    assert!(!logger.has_file_sink(), "console-only logger should not hold a file guard");

    let err = Logger::builder()
        .name("stager-init-twice-second")
        .console_json()
        .init()
        .expect_err("second init should fail");

    assert!(matches!(err, LoggerError::Subscriber { .. }));
}
