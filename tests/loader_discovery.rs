mod common;
use crate::common::builders::{ConfigFileBuilder, ScriptTableBuilder};
use crate::common::{fake_scripts, init_tracing};

use scripthook::errors::{ErrorKind, ScriptError};
use scripthook::loader::{
    install_dependencies, parse_metadata, Blacklist, NoopInstaller, Requirement, ScriptCatalog,
    ScriptLoader,
};
use scripthook::types::ScriptStatus;
use scripthook_test_utils::fake_installer::RecordingInstaller;

fn catalog_of(names: &[&str]) -> ScriptCatalog {
    let mut catalog = ScriptCatalog::new();
    for name in names {
        catalog.register(*name, fake_scripts::returns(name));
    }
    catalog
}

fn names(units: &[scripthook::loader::ScriptUnit]) -> Vec<&str> {
    units.iter().map(|u| u.name()).collect()
}

#[test]
fn discovery_is_in_lexical_order() {
    init_tracing();
    let catalog = catalog_of(&["zeta", "alpha", "mid"]);
    let config = ConfigFileBuilder::new().build();

    let units = ScriptLoader::new(&catalog, &config, &NoopInstaller).discover();
    assert_eq!(names(&units), vec!["alpha", "mid", "zeta"]);
}

#[test]
fn missing_entry_points_are_skipped_not_fatal() {
    init_tracing();
    let mut catalog = catalog_of(&["good"]);
    catalog.declare("declared_only");
    let config = ConfigFileBuilder::new()
        .with_script("manifest_only", ScriptTableBuilder::new().version("1.0.0").build())
        .build();

    let report = ScriptLoader::new(&catalog, &config, &NoopInstaller).discover_with_report();
    assert_eq!(names(&report.units), vec!["good"]);

    let skipped: Vec<_> = report
        .skipped
        .iter()
        .map(|e| (e.script().unwrap(), e.kind()))
        .collect();
    assert_eq!(
        skipped,
        vec![("declared_only", ErrorKind::Load), ("manifest_only", ErrorKind::Load)]
    );
}

#[test]
fn malformed_metadata_only_disqualifies_its_own_unit() {
    init_tracing();
    let catalog = catalog_of(&["bad_version", "bad_status", "bad_author", "fine"]);
    let config = ConfigFileBuilder::new()
        .with_script("bad_version", ScriptTableBuilder::new().version("1.0").build())
        .with_script("bad_status", ScriptTableBuilder::new().status("Stable").build())
        .with_script(
            "bad_author",
            ScriptTableBuilder::new()
                .field("author", toml::Value::Integer(42))
                .build(),
        )
        .with_script(
            "fine",
            ScriptTableBuilder::new()
                .status("production")
                .version("2.0.0")
                .field("homepage", toml::Value::String("ignored".into()))
                .build(),
        )
        .build();

    let report = ScriptLoader::new(&catalog, &config, &NoopInstaller).discover_with_report();
    assert_eq!(names(&report.units), vec!["fine"]);
    assert_eq!(report.skipped.len(), 3);
    assert!(report
        .skipped
        .iter()
        .all(|e| matches!(e, ScriptError::ImportScript { .. })));

    let fine = &report.units[0];
    assert_eq!(fine.metadata().status, Some(ScriptStatus::Production));
    assert_eq!(fine.metadata().version.as_deref(), Some("2.0.0"));
}

#[test]
fn blacklisted_dependency_skips_unit_without_installing() {
    init_tracing();
    let catalog = catalog_of(&["needs_it"]);
    let config = ConfigFileBuilder::new()
        .blacklist("Some_Package")
        .with_script(
            "needs_it",
            ScriptTableBuilder::new().dependency("some-package>=1.0").build(),
        )
        .build();
    let installer = RecordingInstaller::new();

    let report = ScriptLoader::new(&catalog, &config, &installer).discover_with_report();
    assert!(report.units.is_empty());
    assert!(matches!(
        report.skipped[0],
        ScriptError::DependencyBlacklisted { .. }
    ));
    assert_eq!(report.skipped[0].kind(), ErrorKind::Dependency);
    assert!(installer.installed().is_empty());
}

#[test]
fn installer_failure_skips_only_that_unit() {
    init_tracing();
    let catalog = catalog_of(&["weather", "plain"]);
    let config = ConfigFileBuilder::new()
        .with_script(
            "weather",
            ScriptTableBuilder::new()
                .dependencies(&["requests", "aiohttp>=0.15.3"])
                .build(),
        )
        .build();
    let installer = RecordingInstaller::new().failing("aiohttp");

    let report = ScriptLoader::new(&catalog, &config, &installer).discover_with_report();
    assert_eq!(names(&report.units), vec!["plain"]);
    assert_eq!(report.skipped[0].as_label(), "install_dependency");
    assert_eq!(
        installer.installed(),
        vec!["requests".to_string(), "aiohttp>=0.15.3".to_string()]
    );
}

#[test]
fn dependency_of_wrong_type_is_an_install_error() {
    let table = ScriptTableBuilder::new()
        .field(
            "dependencies",
            toml::Value::Array(vec![toml::Value::Integer(7)]),
        )
        .build();
    let err = parse_metadata("typed", Some(&table)).unwrap_err();
    assert!(matches!(err, ScriptError::InstallDependency { .. }));

    let table = ScriptTableBuilder::new().dependency("!!not a spec").build();
    let err = parse_metadata("typed", Some(&table)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Dependency);
}

#[test]
fn single_dependency_string_equals_one_element_list() {
    let single = ScriptTableBuilder::new().dependency("aiohttp>=0.15.3").build();
    let list = ScriptTableBuilder::new().dependencies(&["aiohttp>=0.15.3"]).build();

    let a = parse_metadata("s", Some(&single)).unwrap();
    let b = parse_metadata("s", Some(&list)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.dependencies.len(), 1);
}

#[test]
fn installing_zero_dependencies_is_a_no_op() {
    let installer = RecordingInstaller::new();
    install_dependencies("none", &[], &Blacklist::default(), &installer).unwrap();
    assert!(installer.installed().is_empty());

    let meta = parse_metadata("none", None).unwrap();
    assert!(meta.is_empty());
}

#[test]
fn requirement_specifiers_parse() {
    let req: Requirement = "aiohttp>=0.15.3".parse().unwrap();
    assert_eq!(req.name(), "aiohttp");
    assert_eq!(req.constraint(), Some(">=0.15.3"));

    let req: Requirement = "Requests[socks] == 2.0".parse().unwrap();
    assert_eq!(req.to_string(), "Requests[socks]==2.0");
    assert_eq!(req.normalized_name(), "requests");

    let req: Requirement = "six".parse().unwrap();
    assert_eq!(req.constraint(), None);

    assert!("".parse::<Requirement>().is_err());
    assert!(">=1.0".parse::<Requirement>().is_err());
}

#[test]
fn error_labels_are_stable() {
    let err = ScriptError::BadBehavingScript {
        name: "stubborn".into(),
    };
    assert_eq!(err.kind(), ErrorKind::BadBehavior);
    assert_eq!(err.as_label(), "bad_behaving_script");
    assert_eq!(err.to_string(), "script \"stubborn\" did not stop in time");

    let err = ScriptError::ShutdownJoin {
        timeout: std::time::Duration::from_millis(1500),
    };
    assert_eq!(err.kind(), ErrorKind::ShutdownJoin);
    assert_eq!(err.script(), None);
}
