//! Integration tests for configuration loading

use compass_core::infra::Config;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();

    let config_content = r#"
[heading]
smoothing_factor = 0.2

[navigation]
smoothing_factor = 0.15
arrival_buffer_m = 25.0

[places]
file = "data/test-places.jsonl"
search_limit = 5

[altimeter]
sea_level_hpa = 1020.0

[session_log]
file = "logs/test-sessions.jsonl"

[pipeline]
event_queue_capacity = 64
update_queue_capacity = 32

[metrics]
interval_secs = 15
"#;

    temp_file.write_all(config_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();

    assert_eq!(config.heading_smoothing(), 0.2);
    assert_eq!(config.arrow_smoothing(), 0.15);
    assert_eq!(config.arrival_buffer_m(), 25.0);
    assert_eq!(config.places_file(), "data/test-places.jsonl");
    assert_eq!(config.search_limit(), 5);
    assert_eq!(config.sea_level_hpa(), 1020.0);
    assert_eq!(config.session_log_file(), "logs/test-sessions.jsonl");
    assert_eq!(config.event_queue_capacity(), 64);
    assert_eq!(config.update_queue_capacity(), 32);
    assert_eq!(config.metrics_interval_secs(), 15);
}

#[test]
fn test_missing_sections_fall_back_to_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[navigation]\narrival_buffer_m = 50.0\n")
        .unwrap();
    temp_file.flush().unwrap();

    let config = Config::from_file(temp_file.path()).unwrap();
    assert_eq!(config.arrival_buffer_m(), 50.0);
    assert_eq!(config.heading_smoothing(), 0.1);
    assert_eq!(config.places_file(), "data/places.jsonl");
    assert_eq!(config.metrics_interval_secs(), 10);
}

#[test]
fn test_load_from_path_fallback() {
    let config = Config::load_from_path("/nonexistent/config.toml");
    assert_eq!(config.heading_smoothing(), 0.1);
    assert_eq!(config.arrival_buffer_m(), 10.0);
    assert_eq!(config.search_limit(), 3);
}

#[test]
fn test_unparsable_file_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"not a toml file {{{{").unwrap();
    temp_file.flush().unwrap();

    assert!(Config::from_file(temp_file.path()).is_err());
}
