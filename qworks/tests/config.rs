///
/// Config file loading tests
///

use std::io::Write;

use qworks::{load_config_file, ConfigError, RunConfig, Tuning};

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "seed = 77").unwrap();
    writeln!(file, "[tuning]").unwrap();
    writeln!(file, "capacity_per_producer = 4").unwrap();
    writeln!(file, "timeout_secs = 9").unwrap();

    let loaded = load_config_file(file.path()).unwrap();
    assert_eq!(loaded.seed, Some(77));
    assert_eq!(loaded.tuning.capacity_per_producer, 4);
    assert_eq!(loaded.tuning.timeout_secs, 9);
    assert_eq!(loaded.tuning.warmup_ms, Tuning::default().warmup_ms);

    let config = RunConfig::new(2, 3, 1, 10).with_file(loaded);
    assert_eq!(config.data_queue_capacity(), 12);
    assert_eq!(config.function_queue_capacity(), 8);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    match load_config_file(&path) {
        Err(ConfigError::Read { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected read error, got {:?}", other),
    }
}

#[test]
fn test_malformed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[tuning").unwrap();

    assert!(matches!(load_config_file(file.path()), Err(ConfigError::Parse(_))));
}

#[test]
fn test_zero_capacity_fails_validation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[tuning]\ncapacity_per_producer = 0").unwrap();

    let config = RunConfig::new(1, 1, 1, 1).with_file(load_config_file(file.path()).unwrap());
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}
