use url_manager::telemetry::{OutputFormat, SubscriberConfig, init_subscriber};

#[test]
fn init_subscriber_writes_to_file_and_tolerates_reinit() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = dir.path().join("url-manager.log");
    let config = SubscriberConfig::builder()
        .log_level(tracing::Level::DEBUG)
        .output_format(OutputFormat::JsonCompact)
        .log_file(&log_file)
        .build();

    let guard = init_subscriber(config).unwrap();
    assert!(guard.is_some());
    tracing::debug!(target: "url_manager::http", status = 200, "response received");
    drop(guard);

    let written = std::fs::read_to_string(&log_file).unwrap();
    assert!(written.contains("response received"));

    // A second global subscriber cannot be installed; that is not an error.
    assert!(init_subscriber(SubscriberConfig::default()).unwrap().is_none());
}
