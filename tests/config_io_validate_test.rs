use gridfeed::config::Config;
use gridfeed::types::TimeAggregate;
use std::fs;

#[test]
fn save_and_load_yaml_roundtrip() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("config.yaml");

    let mut cfg = Config::default();
    cfg.dashboard.zone_id = Some("DK-DK2".to_string());
    cfg.dashboard.features = vec!["history".to_string()];
    cfg.dashboard.time_aggregate = TimeAggregate::Monthly;
    cfg.fetch.data_fetch_interval_ms = 60_000;
    cfg.logging.file = path.with_extension("log").to_string_lossy().to_string();

    cfg.save_to_file(&path).unwrap();
    let loaded = Config::load(Some(path.as_path())).unwrap();

    assert_eq!(loaded.dashboard.zone_id.as_deref(), Some("DK-DK2"));
    assert_eq!(loaded.dashboard.features, vec!["history".to_string()]);
    assert_eq!(loaded.dashboard.time_aggregate, TimeAggregate::Monthly);
    assert_eq!(loaded.fetch.data_fetch_interval().as_secs(), 60);
    assert_eq!(loaded.logging.file, cfg.logging.file);
}

#[test]
fn config_validation_errors() {
    let mut cfg = Config::default();
    assert!(cfg.validate().is_ok());

    cfg.fetch.data_fetch_interval_ms = 0;
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.dashboard.features = vec!["history".to_string(), " ".to_string()];
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.timezone = "Europe/Copenhagen".to_string();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.tz().unwrap(), chrono_tz::Europe::Copenhagen);
}

#[test]
fn from_file_with_invalid_yaml_fails() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"bad: [unclosed").unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    let msg = format!("{}", err);
    assert!(msg.contains("Serialization error"));
}

#[test]
fn unknown_aggregate_in_yaml_is_rejected() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"dashboard:\n  time_aggregate: weekly\n").unwrap();
    assert!(Config::from_file(tmp.path()).is_err());
}

#[test]
fn load_with_missing_explicit_path_fails() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let err = Config::load(Some(tmp_dir.path().join("absent.yaml").as_path())).unwrap_err();
    assert!(format!("{}", err).contains("I/O error"));
}

#[test]
fn load_validates_file_contents() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"fetch:\n  data_fetch_interval_ms: 0\n").unwrap();
    let err = Config::load(Some(tmp.path())).unwrap_err();
    assert!(format!("{}", err).contains("fetch.data_fetch_interval_ms"));
}
