use gpuscope::{BackendKind, Config};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(config.disabled_backends.is_empty());
    assert_eq!(config.smi_command, "nvidia-smi");
    assert_eq!(config.poll_interval_ms, 2000);
}

#[test]
fn test_missing_file_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load_from(&temp_dir.path().join("config.json")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_empty_and_corrupt_files_return_default() {
    let temp_dir = TempDir::new().unwrap();

    let empty = temp_dir.path().join("empty.json");
    fs::write(&empty, b"").unwrap();
    assert_eq!(Config::load_from(&empty).unwrap(), Config::default());

    let corrupt = temp_dir.path().join("corrupt.json");
    fs::write(&corrupt, b"{ not json").unwrap();
    assert_eq!(Config::load_from(&corrupt).unwrap(), Config::default());
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let mut config = Config {
        smi_command: "/opt/nvidia/bin/nvidia-smi".to_string(),
        poll_interval_ms: 750,
        ..Default::default()
    };
    config.disable_backend(BackendKind::CommandScrape);

    config.save_to(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();

    assert_eq!(loaded, config);
    assert!(!loaded.is_enabled(BackendKind::CommandScrape));
}

#[test]
fn test_unreadable_path_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::create_dir(&path).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_backend_names_serialize_like_cli() {
    let mut config = Config::default();
    config.disable_backend(BackendKind::AmdSysfs);

    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"amd-sysfs\""));
}

#[test]
fn test_hand_edited_backend_names_are_kept() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"poll_interval_ms":500,"smi_command":"/opt/smi","disabled_backends":["amd-sysfs","smi_query"]}"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.poll_interval_ms, 500);
    assert_eq!(config.smi_command, "/opt/smi");
    assert_eq!(
        config.disabled_backends,
        vec![BackendKind::AmdSysfs, BackendKind::SmiQuery]
    );
}

#[test]
fn test_unknown_backend_entry_keeps_other_settings() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"poll_interval_ms":750,"disabled_backends":["opencl","nvml"]}"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.poll_interval_ms, 750);
    assert_eq!(config.disabled_backends, vec![BackendKind::Nvml]);
}
