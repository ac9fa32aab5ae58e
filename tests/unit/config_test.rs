//! Unit tests for config module

use bondlog::Config;

#[test]
fn default_config_has_expected_values() {
    let config = Config::default();
    assert_eq!(config.merge.log_name, "messages.log");
    assert!(config.scan.parallel);
    assert!(config.archive.scratch_dir.is_none());
    assert_eq!(config.worker.objects_dir, "~/.local/share/bondlog/objects");
    assert_eq!(config.worker.store_path, "~/.local/share/bondlog/telemetry.jsonl");
}

#[test]
fn config_serialization_roundtrip() {
    let mut config = Config::default();
    config.archive.scratch_dir = Some("/var/tmp/bondlog".to_string());
    let toml_str = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&toml_str).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn empty_file_is_all_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn worker_section_parses_from_toml() {
    let toml_str = r#"
[worker]
objects_dir = "/srv/objects"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.objects_dir(), std::path::PathBuf::from("/srv/objects"));
    assert_eq!(config.worker.store_path, "~/.local/share/bondlog/telemetry.jsonl");
}

#[test]
fn scratch_dir_expands_home() {
    let toml_str = r#"
[archive]
scratch_dir = "~/scratch"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let scratch = config.scratch_dir().unwrap();
    if let Some(home) = dirs::home_dir() {
        assert_eq!(scratch, home.join("scratch"));
    }
}

#[test]
fn wrong_type_is_rejected() {
    let toml_str = r#"
[scan]
parallel = "yes"
"#;
    assert!(toml::from_str::<Config>(toml_str).is_err());
}
