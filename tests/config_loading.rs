use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::tempdir;

use scripthook::config::{
    default_config_path, load_and_validate, load_or_default, ConfigFile, HostOptions,
};
use scripthook::errors::ScripthookError;
use scripthook::fs::mock::MockFileSystem;
use scripthook::fs::RealFileSystem;
use scripthook_test_utils::builders::ConfigFileBuilder;

#[test]
fn full_config_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Scripthook.toml");
    fs::write(
        &path,
        r#"
[host]
stop_timeout = "250ms"
join_timeout = "1s"
tick_interval = "20ms"
log_file = "out.log"

[loader]
blacklist = ["pip"]

[script.wanted]
author = "Jane Doe <jane@example.com>"
status = "Production"
version = "2.0.0"
dependencies = "aiohttp>=0.15.3"
"#,
    )
    .unwrap();

    let cfg = load_and_validate(&RealFileSystem, &path).unwrap();
    assert_eq!(cfg.host.stop_timeout, Duration::from_millis(250));
    assert_eq!(cfg.host.join_timeout, Duration::from_secs(1));
    assert_eq!(cfg.host.tick_interval, Duration::from_millis(20));
    assert_eq!(cfg.host.log_file, Path::new("out.log"));
    assert_eq!(cfg.loader.blacklist, vec!["pip".to_string()]);

    // Script tables stay raw for the loader.
    let table = cfg.metadata_table("wanted").unwrap();
    assert_eq!(table.get("version").and_then(|v| v.as_str()), Some("2.0.0"));
    assert!(cfg.metadata_table("running").is_none());
}

#[test]
fn empty_file_gives_defaults() {
    let fs = MockFileSystem::new();
    fs.add_file("Scripthook.toml", "");

    let cfg = load_and_validate(&fs, "Scripthook.toml").unwrap();
    assert_eq!(cfg.host, HostOptions::default());
    assert!(cfg.script.is_empty());
}

#[test]
fn missing_default_file_means_defaults_but_explicit_path_is_an_error() {
    let fs = MockFileSystem::new();

    let cfg = load_or_default(&fs, default_config_path()).unwrap();
    assert_eq!(cfg.host.stop_timeout, Duration::from_secs(1));
    assert_eq!(cfg.host.join_timeout, Duration::from_millis(1500));

    assert!(load_or_default(&fs, "configs/custom.toml").is_err());
}

#[test]
fn join_timeout_must_exceed_stop_timeout() {
    let raw = ConfigFileBuilder::new()
        .stop_timeout("2s")
        .join_timeout("1s")
        .raw();
    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(matches!(err, ScripthookError::ConfigError(msg) if msg.contains("join_timeout")));
}

#[test]
fn malformed_values_are_rejected() {
    let cases = [
        ConfigFileBuilder::new().stop_timeout("soon").raw(),
        ConfigFileBuilder::new().stop_timeout("0ms").raw(),
        ConfigFileBuilder::new().stop_timeout("6000000000000000h").raw(),
        ConfigFileBuilder::new().join_timeout("400000000000000000m").raw(),
        ConfigFileBuilder::new().tick_interval("0s").raw(),
        ConfigFileBuilder::new().blacklist("  ").raw(),
        ConfigFileBuilder::new()
            .with_script("bad name", toml::Table::new())
            .raw(),
    ];
    for raw in cases {
        assert!(ConfigFile::try_from(raw).is_err());
    }
}

#[test]
fn toml_syntax_errors_surface_as_toml_errors() {
    let fs = MockFileSystem::new();
    fs.add_file("broken.toml", "[host\nstop_timeout = 1");

    let err = load_and_validate(&fs, "broken.toml").unwrap_err();
    assert!(matches!(err, ScripthookError::TomlError(_)));
}

#[test]
fn shipped_manifest_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("Scripthook.toml");
    let cfg = load_and_validate(&RealFileSystem, &path).unwrap();
    for name in ["helper", "metadata", "running", "wanted"] {
        assert!(cfg.metadata_table(name).is_some(), "missing [script.{name}]");
    }
}
