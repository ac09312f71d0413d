use super::*;

use crate::loader::layers::ConfigLayerSource;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::fs;
use std::path::PathBuf;

fn paths_in(root: &std::path::Path) -> ConfigPaths {
    ConfigPaths {
        system: Some(root.join("etc/applaunch.toml")),
        user: Some(root.join("home/applaunch.toml")),
    }
}

fn write(path: &std::path::Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("config path has a parent"))
        .expect("failed to create config dir");
    fs::write(path, contents).expect("failed to write config");
}

#[test]
#[serial]
fn test_layered_config_loading() {
    let root = assert_fs::TempDir::new().expect("failed to create root");
    let paths = paths_in(root.path());
    write(
        paths.system.as_deref().unwrap(),
        "[launch]\nproxy = false\nproxy_dir_name = \"proxies\"\n",
    );
    write(paths.user.as_deref().unwrap(), "[launch]\nproxy = true\n");

    let manager = ConfigManager::load_with_paths(&paths).expect("failed to load config");

    assert!(manager.config().launch.proxy);
    assert_eq!(manager.config().launch.proxy_dir_name, "proxies");
    let layers = manager.layer_stack().layers();
    assert_eq!(layers.len(), 2);
    assert!(matches!(layers[0].source, ConfigLayerSource::System { .. }));
    assert!(matches!(layers[1].source, ConfigLayerSource::User { .. }));
    assert_eq!(manager.config_path(), paths.user.as_deref());
}

#[test]
#[serial]
fn test_defaults_without_files() {
    let root = assert_fs::TempDir::new().expect("failed to create root");
    let manager = ConfigManager::load_with_paths(&paths_in(root.path())).expect("defaults load");

    assert_eq!(manager.config(), &ApplaunchConfig::default());
    assert!(manager.config_path().is_none());
    assert!(manager.layer_stack().layers().is_empty());
}

#[test]
#[serial]
fn test_unparsable_implicit_layer_is_skipped() {
    let root = assert_fs::TempDir::new().expect("failed to create root");
    let paths = paths_in(root.path());
    write(paths.system.as_deref().unwrap(), "[launch\nproxy = ");
    write(paths.user.as_deref().unwrap(), "[confinement]\nunit_prefix = \"desk\"\n");

    let manager = ConfigManager::load_with_paths(&paths).expect("failed to load config");

    assert_eq!(manager.layer_stack().layers().len(), 1);
    assert_eq!(manager.config().confinement.unit_prefix, "desk");
}

#[test]
#[serial]
fn test_config_builder_overrides() {
    let root = assert_fs::TempDir::new().expect("failed to create root");
    let explicit = root.path().join("custom.toml");
    write(&explicit, "[confinement]\njob_timeout_secs = 5\n");

    let manager = ConfigBuilder::new()
        .paths(ConfigPaths::none())
        .config_file(explicit.clone())
        .cli_overrides(&[
            ("launch.proxy".to_string(), "false".to_string()),
            ("confinement.unit_prefix".to_string(), "kiosk".to_string()),
            ("launch.runtime_dir".to_string(), "/tmp/rt".to_string()),
        ])
        .build()
        .expect("failed to build config");

    let config = manager.config();
    assert!(!config.launch.proxy);
    assert_eq!(config.confinement.unit_prefix, "kiosk");
    assert_eq!(config.confinement.job_timeout_secs, 5);
    assert_eq!(config.launch.runtime_dir, Some(PathBuf::from("/tmp/rt")));
    assert_eq!(manager.config_path(), Some(explicit.as_path()));
    assert!(matches!(
        manager.layer_stack().layers().last().map(|layer| &layer.source),
        Some(ConfigLayerSource::Runtime)
    ));
}

#[test]
#[serial]
fn test_invalid_override_fails_validation() {
    let result = ConfigBuilder::new()
        .paths(ConfigPaths::none())
        .cli_override(
            "confinement.unit_prefix".to_string(),
            toml::Value::String("bad/prefix".to_string()),
        )
        .build();

    let err = result.expect_err("slash in unit prefix must be rejected");
    assert!(format!("{err:#}").contains("unit_prefix"));
}

#[test]
fn test_validate_proxy_dir_name() {
    let mut config = ApplaunchConfig::default();
    assert!(config.validate().is_ok());

    config.launch.proxy_dir_name = String::new();
    assert!(config.validate().is_err());

    config.launch.proxy_dir_name = "a/b".to_string();
    assert!(config.validate().is_err());

    config.launch.proxy_dir_name = "..".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_parse_override() {
    assert_eq!(
        parse_override("launch.proxy = false").unwrap(),
        ("launch.proxy".to_string(), "false".to_string())
    );
    assert!(parse_override("launch.proxy").is_err());
    assert!(parse_override("launch..proxy=1").is_err());
    assert!(parse_override("=1").is_err());
}

#[test]
fn test_merge_replaces_scalars_and_merges_tables() {
    let mut base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
    let overlay: toml::Value = toml::from_str("[a]\ny = 3\nz = 4\n").unwrap();
    merge_toml_values(&mut base, &overlay);
    let expected: toml::Value = toml::from_str("[a]\nx = 1\ny = 3\nz = 4\n").unwrap();
    assert_eq!(base, expected);
}
