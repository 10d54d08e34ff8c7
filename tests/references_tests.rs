//! Integration tests of the reference validation rule.

mod common;

use common::{fixture_path, RecordingProber};
use sbom_enforcer::builder::{BomBuilder, CycloneDxBomBuilder};
use sbom_enforcer::model::{ArtifactCoordinate, BillOfMaterials, BomBuilderRequest};
use sbom_enforcer::resolver::NoOpResolver;
use sbom_enforcer::rules::{EnforcerRule, ValidateReferencesConfig, ValidateReferencesRule};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const MAIN_WEBSITE: &str = "https://www.example.org/status/200";
const MAIN_INTAKE: &str = "https://intake.example.org/status/404";
const DEPENDENCY_TRACKER: &str = "https://issues.example.org/status/404";

fn build(bom_file: &Path) -> BillOfMaterials {
    let artifact = ArtifactCoordinate::new("org.example", "app", "1.0", "jar");
    let bom = artifact
        .with_classifier("cyclonedx")
        .with_extension("json")
        .with_file(Some(bom_file.to_path_buf()));
    CycloneDxBomBuilder::new()
        .build(&NoOpResolver, &BomBuilderRequest::new(artifact, bom))
        .expect("valid BOM")
}

fn mock_bom() -> BillOfMaterials {
    build(&fixture_path("mock-cyclonedx.json"))
}

fn rule(config: ValidateReferencesConfig) -> (ValidateReferencesRule, Arc<RecordingProber>) {
    let prober = Arc::new(RecordingProber::new());
    (ValidateReferencesRule::with_prober(config, prober.clone()), prober)
}

fn sorted(mut calls: Vec<String>) -> Vec<String> {
    calls.sort();
    calls
}

#[test]
fn test_dependency_errors_only_logged_by_default() {
    let (rule, prober) = rule(ValidateReferencesConfig::default());

    rule.execute(&mock_bom()).expect("main references are valid");
    assert_eq!(
        sorted(prober.calls()),
        vec![DEPENDENCY_TRACKER.to_string(), MAIN_WEBSITE.to_string()]
    );
}

#[test]
fn test_fail_on_dependencies() {
    let (rule, _) = rule(ValidateReferencesConfig {
        fail_on_dependencies: true,
        ..ValidateReferencesConfig::default()
    });

    let failure = rule.execute(&mock_bom()).unwrap_err();
    assert_eq!(
        failure.header(),
        "SBOM org.example:app:json:cyclonedx:1.0 contains invalid references"
    );
    assert_eq!(
        failure.messages(),
        [format!("Broken external reference (404): {DEPENDENCY_TRACKER}")]
    );
}

#[test]
fn test_dependencies_not_checked() {
    let (rule, prober) = rule(ValidateReferencesConfig {
        check_dependencies: false,
        fail_on_dependencies: true,
        ..ValidateReferencesConfig::default()
    });

    rule.execute(&mock_bom()).expect("main references are valid");
    assert_eq!(prober.calls(), vec![MAIN_WEBSITE.to_string()]);
}

#[test]
fn test_includes_restrict_checked_types() {
    let (rule, prober) = rule(ValidateReferencesConfig {
        includes: BTreeSet::from(["website".to_string()]),
        fail_on_dependencies: true,
        ..ValidateReferencesConfig::default()
    });

    rule.execute(&mock_bom()).expect("only the website is checked");
    assert_eq!(prober.calls(), vec![MAIN_WEBSITE.to_string()]);
}

#[test]
fn test_excluded_types_can_be_enabled() {
    let (rule, _) = rule(ValidateReferencesConfig {
        excludes: BTreeSet::new(),
        ..ValidateReferencesConfig::default()
    });

    let failure = rule.execute(&mock_bom()).unwrap_err();
    assert_eq!(
        failure.messages(),
        [format!("Broken external reference (404): {MAIN_INTAKE}")]
    );
}

#[test]
fn test_unreachable_main_reference_fails() {
    let dir = TempDir::new().unwrap();
    let content = std::fs::read_to_string(fixture_path("mock-cyclonedx.json"))
        .unwrap()
        .replace(MAIN_WEBSITE, "https://down.example.org/exception");
    let path = dir.path().join("mock-cyclonedx.json");
    std::fs::write(&path, content).unwrap();

    let (rule, _) = rule(ValidateReferencesConfig::default());
    let failure = rule.execute(&build(&path)).unwrap_err();
    assert_eq!(failure.messages().len(), 1);
    assert!(failure.messages()[0].contains("https://down.example.org/exception"));
    assert!(failure.to_string().contains("contains invalid references"));
}

#[test]
fn test_each_run_starts_with_empty_cache() {
    let (rule, prober) = rule(ValidateReferencesConfig::default());
    let bom = mock_bom();

    rule.execute(&bom).expect("first run");
    rule.execute(&bom).expect("second run");
    let website_calls = prober
        .calls()
        .iter()
        .filter(|url| url.as_str() == MAIN_WEBSITE)
        .count();
    assert_eq!(website_calls, 2);
}
