//! Integration tests for building the component graph from CycloneDX documents.

mod common;

use common::{fixture_path, MapResolver};
use sbom_enforcer::builder::{BomBuilder, CycloneDxBomBuilder};
use sbom_enforcer::error::{EnforcerError, StructureErrorKind};
use sbom_enforcer::model::{
    ArtifactCoordinate, BomBuilderRequest, ChecksumAlgorithm, DiagnosticKind, ExternalReference,
    PackageIdentifier,
};
use sbom_enforcer::resolver::NoOpResolver;

const LOG4J_API_JAR: &str = "org.apache.logging.log4j:log4j-api:jar:2.24.3";
const LOG4J_API_XML_BOM: &str = "org.apache.logging.log4j:log4j-api:xml:cyclonedx:2.24.3";
const LOG4J_API_JSON_BOM: &str = "org.apache.logging.log4j:log4j-api:json:cyclonedx:2.24.3";

fn log4j_core() -> ArtifactCoordinate {
    ArtifactCoordinate::new("org.apache.logging.log4j", "log4j-core", "2.24.3", "jar")
}

fn request_for(artifact: ArtifactCoordinate, bom_fixture: &str, extension: &str) -> BomBuilderRequest {
    let bom = artifact
        .with_classifier("cyclonedx")
        .with_extension(extension)
        .with_file(Some(fixture_path(bom_fixture)));
    BomBuilderRequest::new(artifact, bom)
}

#[test]
fn test_create_bom() {
    let resolver = MapResolver::new()
        .with_artifact(LOG4J_API_JAR, fixture_path("mock-artifact.jar"))
        .with_artifact(LOG4J_API_XML_BOM, fixture_path("simple-cyclonedx.xml"));
    let request = request_for(log4j_core(), "simple-cyclonedx.xml", "xml");

    let bom = CycloneDxBomBuilder::new()
        .build(&resolver, &request)
        .expect("valid BOM");

    // Main component
    let component = bom.component();
    assert_eq!(
        component.purl(),
        Some(&PackageIdentifier::parse("pkg:maven/org.apache.logging.log4j/log4j-core@2.24.3?type=jar").unwrap())
    );
    assert_eq!(component.artifact().key(), log4j_core().key());
    assert_eq!(component.bills_of_materials(), [request.main_bill_of_materials().clone()]);
    assert!(component.checksums().is_empty());
    let references: Vec<_> = component.external_references().cloned().collect();
    assert_eq!(
        references,
        vec![ExternalReference::new(
            "vulnerability-assertion",
            "https://logging.apache.org/cyclonedx/vdr.xml"
        )]
    );

    // Dependencies
    assert_eq!(bom.dependencies().len(), 1);
    let dependency = bom.dependencies().next().unwrap();
    assert_eq!(dependency.artifact().to_string(), LOG4J_API_JAR);
    assert_eq!(dependency.artifact().file(), Some(fixture_path("mock-artifact.jar").as_path()));
    assert_eq!(dependency.bills_of_materials().len(), 1);
    assert_eq!(dependency.bills_of_materials()[0].to_string(), LOG4J_API_XML_BOM);
    assert_eq!(dependency.checksums().len(), 2);
    assert_eq!(
        dependency.checksums().get(&ChecksumAlgorithm::Md5).map(String::as_str),
        Some("d89516699543c5c21be87ee1760695f3")
    );
    assert_eq!(
        dependency.checksums().get(&ChecksumAlgorithm::Sha1).map(String::as_str),
        Some("b02c125db8b6d295adf72ae6e71af5d83bce2370")
    );
    assert_eq!(dependency.external_references().count(), 0);
    assert!(bom.diagnostics().is_empty());

    // The artifact and both BOM formats were looked up once each
    assert_eq!(
        resolver.requests(),
        vec![LOG4J_API_JAR, LOG4J_API_JSON_BOM, LOG4J_API_XML_BOM]
    );
}

#[test]
fn test_unresolved_dependency_is_kept_without_file() {
    let request = request_for(log4j_core(), "simple-cyclonedx.xml", "xml");

    let bom = CycloneDxBomBuilder::new()
        .build(&NoOpResolver, &request)
        .expect("valid BOM");

    let dependency = bom.dependencies().next().unwrap();
    assert_eq!(dependency.artifact().file(), None);
    assert!(dependency.bills_of_materials().is_empty());
    assert_eq!(dependency.checksums().len(), 2);

    let kinds: Vec<_> = bom.diagnostics().iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::ArtifactUnresolved]);
}

#[test]
fn test_bom_lookup_failure_is_recorded() {
    let resolver = MapResolver::new()
        .with_artifact(LOG4J_API_JAR, fixture_path("mock-artifact.jar"))
        .with_broken(LOG4J_API_JSON_BOM, "HTTP 500");
    let request = request_for(log4j_core(), "simple-cyclonedx.xml", "xml");

    let bom = CycloneDxBomBuilder::new()
        .build(&resolver, &request)
        .expect("valid BOM");

    let dependency = bom.dependencies().next().unwrap();
    assert!(dependency.artifact().file().is_some());
    assert!(dependency.bills_of_materials().is_empty());
    assert_eq!(bom.diagnostics().len(), 1);
    assert_eq!(bom.diagnostics()[0].kind, DiagnosticKind::BomLookupFailed);
    assert!(bom.diagnostics()[0].message.contains("HTTP 500"));
}

#[test]
fn test_unusable_dependencies_are_skipped() {
    let artifact = ArtifactCoordinate::new("org.example", "app", "1.0", "jar");
    let request = request_for(artifact, "unknown-algorithm-cyclonedx.json", "json");

    let bom = CycloneDxBomBuilder::new()
        .build(&NoOpResolver, &request)
        .expect("main component is valid");

    let names: Vec<_> = bom.dependencies().map(|c| c.artifact().name()).collect();
    assert_eq!(names, vec!["kept"]);

    let skipped: Vec<_> = bom
        .diagnostics()
        .iter()
        .filter(|d| d.kind == DiagnosticKind::ComponentSkipped)
        .map(|d| d.component.as_str())
        .collect();
    assert_eq!(skipped, vec!["org.example:future", "anonymous"]);
    assert!(bom.diagnostics().iter().any(|d| d.message.contains("SHA-4096")));
}

#[test]
fn test_missing_metadata_is_structural() {
    let artifact = ArtifactCoordinate::new("org.example", "app", "1.0", "jar");
    let request = request_for(artifact, "no-metadata-cyclonedx.json", "json");

    let err = CycloneDxBomBuilder::new()
        .build(&NoOpResolver, &request)
        .unwrap_err();
    assert!(matches!(
        err,
        EnforcerError::Structure {
            source: StructureErrorKind::MissingMetadata,
            ..
        }
    ));
}

#[test]
fn test_missing_main_component_is_structural() {
    let artifact = ArtifactCoordinate::new("org.example", "app", "1.0", "jar");
    let request = request_for(artifact, "no-main-component-cyclonedx.json", "json");

    let err = CycloneDxBomBuilder::new()
        .build(&NoOpResolver, &request)
        .unwrap_err();
    assert!(err.is_structural());
    assert!(matches!(
        err,
        EnforcerError::Structure {
            source: StructureErrorKind::MissingMainComponent,
            ..
        }
    ));
}

#[test]
fn test_unresolved_dependency_does_not_affect_others() {
    let resolver = MapResolver::new().with_artifact(
        "org.example:published:jar:1.0",
        fixture_path("mock-artifact.jar"),
    );
    let artifact = ArtifactCoordinate::new("org.example", "app", "1.0", "jar");
    let request = request_for(artifact, "two-dependencies-cyclonedx.json", "json");

    let bom = CycloneDxBomBuilder::new()
        .build(&resolver, &request)
        .expect("valid BOM");

    assert_eq!(bom.component().artifact().name(), "app");
    let files: Vec<_> = bom
        .dependencies()
        .map(|c| (c.artifact().name(), c.artifact().file().is_some()))
        .collect();
    assert_eq!(files, vec![("published", true), ("unpublished", false)]);

    let unresolved: Vec<_> = bom
        .diagnostics()
        .iter()
        .filter(|d| d.kind == DiagnosticKind::ArtifactUnresolved)
        .collect();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(
        unresolved[0].component,
        "pkg:maven/org.example/unpublished@1.0?type=jar"
    );
    assert_eq!(bom.diagnostics().len(), 1);
}

#[test]
fn test_bom_without_file_fails() {
    let artifact = log4j_core();
    let bom = artifact.with_classifier("cyclonedx").with_extension("xml");
    let request = BomBuilderRequest::new(artifact, bom);

    let result = CycloneDxBomBuilder::new().build(&NoOpResolver, &request);
    assert!(matches!(result, Err(EnforcerError::Parse { .. })));
}

#[test]
fn test_is_supported() {
    let builder = CycloneDxBomBuilder::new();
    let artifact = log4j_core();
    assert!(builder.is_supported(&artifact.with_classifier("cyclonedx").with_extension("json")));
    assert!(!builder.is_supported(&artifact));
    assert!(!builder.is_supported(&artifact.with_classifier("spdx").with_extension("json")));
}
