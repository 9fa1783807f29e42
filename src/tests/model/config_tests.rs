use super::*;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = ConsoleConfig::load(&dir.path().join("config.json")).unwrap();
    assert_eq!(cfg.version, CONFIG_VERSION);
    assert!(cfg.gateway.is_none());
    assert_eq!(cfg.list.page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(cfg.timestamps, TimestampMode::Relative);
}

#[test]
fn save_then_load_keeps_gateway_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let mut cfg = ConsoleConfig::default();
    cfg.apply_overrides(Some("http://127.0.0.1:9".to_string()), Some("tok".to_string()));
    cfg.list.page_size = 50;
    cfg.save(&path).unwrap();

    let back = ConsoleConfig::load(&path).unwrap();
    let gw = back.require_gateway().unwrap();
    assert_eq!(gw.base_url, "http://127.0.0.1:9");
    assert_eq!(gw.token.as_deref(), Some("tok"));
    assert_eq!(back.list.page_size, 50);
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn unknown_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"version": 99}"#).unwrap();
    let err = ConsoleConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("unsupported config version 99"));
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"version": 1, "timestamps": "absolute"}"#).unwrap();
    let cfg = ConsoleConfig::load(&path).unwrap();
    assert_eq!(cfg.timestamps, TimestampMode::Absolute);
    assert_eq!(cfg.picker.page_size, DEFAULT_PAGE_SIZE);
}

#[test]
fn token_override_needs_a_gateway() {
    let mut cfg = ConsoleConfig::default();
    cfg.apply_overrides(None, Some("tok".to_string()));
    assert!(cfg.gateway.is_none());
    assert!(cfg.require_gateway().is_err());

    cfg.apply_overrides(Some("http://a".to_string()), None);
    cfg.apply_overrides(Some("http://b".to_string()), Some("t2".to_string()));
    let gw = cfg.require_gateway().unwrap();
    assert_eq!(gw.base_url, "http://b");
    assert_eq!(gw.token.as_deref(), Some("t2"));
}
