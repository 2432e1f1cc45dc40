use cellshape_config::{Config, ConfigError, LogLevel};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.cell_width_px, 8);
    assert_eq!(config.font_size_px, 13.0);
    assert_eq!(config.language, "en");
    assert_eq!(config.shape_cache_capacity, 1024);
    assert_eq!(config.width_cache_capacity, 1024);
    assert!(config.improve_display);
    assert_eq!(config.log_level, LogLevel::Off);
    assert!(config.font_path.is_none());
    assert!(config.font_family.is_none());
}

#[test]
fn test_load_missing_file_returns_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from(&dir.path().join("absent.yaml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_empty_file_returns_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "  \n").unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn test_partial_yaml_uses_defaults_for_missing_fields() {
    let yaml = r#"
cell_width_px: 10
font_family: "Noto Sans Telugu"
log_level: debug
"#;
    let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
    assert_eq!(config.cell_width_px, 10);
    assert_eq!(config.font_family.as_deref(), Some("Noto Sans Telugu"));
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.language, "en");
    assert_eq!(config.shape_cache_capacity, 1024);
    assert!(config.improve_display);
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let config = Config {
        cell_width_px: 9,
        font_path: Some(PathBuf::from("/fonts/Custom.ttf")),
        improve_display: false,
        log_level: LogLevel::Info,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("yaml.tmp").exists());
    assert_eq!(Config::load_from(&path).unwrap(), config);
}

#[test]
fn test_invalid_yaml_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "cell_width_px: [not, a, number]\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Parse(_))
    ));
}

#[test]
fn test_invalid_values_fail_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "cell_width_px: -3\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Validation(_))
    ));
}

#[test]
fn test_save_rejects_invalid_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    let config = Config {
        shape_cache_capacity: 0,
        ..Config::default()
    };
    assert!(config.save_to(&path).is_err());
    assert!(!path.exists());
}

#[test]
fn test_config_path_file_name() {
    let path = Config::config_path();
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("config.yaml")
    );
}
