//! End-to-end integration tests

use std::io::Write;

use pulse_feed::config::Config;

#[test]
fn test_example_config_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();

    assert_eq!(config.feed.url, "ws://127.0.0.1:8765");
    assert_eq!(config.backoff.initial_delay_ms, 1000);
    assert_eq!(config.backoff.multiplier, 2.0);
    assert_eq!(config.backoff.max_delay_ms, 30000);
    assert_eq!(config.backoff.max_attempts, 5);
    assert!(config.analysis.enabled);
    assert_eq!(config.telemetry.log_level, "info");
    assert_eq!(config.telemetry.metrics_port, None);
}

#[test]
fn test_config_load_round_trip() {
    let toml = r#"
        [feed]
        url = "ws://10.1.1.1:8765"
        keepalive_interval_secs = 15

        [backoff]
        initial_delay_ms = 250
        max_attempts = 0

        [analysis]
        enabled = false

        [telemetry]
        log_level = "debug"
        log_format = "json"
        metrics_port = 9100
    "#;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(toml.as_bytes()).unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.feed.url, "ws://10.1.1.1:8765");
    assert_eq!(config.feed.keepalive_interval_secs, 15);
    assert_eq!(config.backoff.initial_delay_ms, 250);
    assert_eq!(config.backoff.max_attempts, 0);
    assert!(!config.analysis.enabled);
    assert_eq!(config.telemetry.metrics_port, Some(9100));
}

#[test]
fn test_config_load_missing_file() {
    assert!(Config::load("/nonexistent/pulse-feed.toml").is_err());
}
