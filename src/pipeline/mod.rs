//! Pipeline orchestration for verification runs.
//!
//! A run builds the component graph once from the main BOM and then hands it
//! to every configured rule. Findings of all rules are collected into a
//! [`Verdict`] instead of stopping at the first failing rule.

use crate::builder::{package_identifier, BomBuilder};
use crate::config::RuleEntry;
use crate::error::{EnforcerError, Result, StructureErrorKind, VerificationFailure};
use crate::model::{ArtifactCoordinate, BillOfMaterials, BomBuilderRequest};
use crate::parsers::{BomFormat, CycloneDxParser, CYCLONEDX_CLASSIFIER};
use crate::resolver::ArtifactResolver;
use crate::rules::{EnforcerRule, RuleRegistry};
use std::path::{Path, PathBuf};

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Every rule passed
    pub const SUCCESS: i32 = 0;
    /// At least one rule reported violations
    pub const VERIFICATION_FAILED: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 2;
}

/// Outcome of a verification run.
#[derive(Debug)]
pub struct Verdict {
    bom: BillOfMaterials,
    failures: Vec<(&'static str, VerificationFailure)>,
}

impl Verdict {
    /// The graph the rules ran against
    #[must_use]
    pub fn bom(&self) -> &BillOfMaterials {
        &self.bom
    }

    /// Failures by rule name, in rule order
    #[must_use]
    pub fn failures(&self) -> &[(&'static str, VerificationFailure)] {
        &self.failures
    }

    /// Returns `true` if no rule failed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Exit code reporting this verdict
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            exit_codes::SUCCESS
        } else {
            exit_codes::VERIFICATION_FAILED
        }
    }
}

/// Build the graph for `request` and run every rule against it.
pub fn verify(
    builder: &dyn BomBuilder,
    resolver: &dyn ArtifactResolver,
    request: &BomBuilderRequest,
    rules: &[Box<dyn EnforcerRule>],
) -> Result<Verdict> {
    let main_bom = request.main_bill_of_materials();
    if !builder.is_supported(main_bom) {
        return Err(EnforcerError::structure(
            format!("BOM artifact {main_bom}"),
            StructureErrorKind::NotABom,
        ));
    }

    let bom = builder.build(resolver, request)?;
    for diagnostic in bom.diagnostics() {
        tracing::debug!("Degraded dependency {}", diagnostic);
    }

    let mut failures = Vec::new();
    for rule in rules {
        tracing::debug!("Running rule {}", rule.name());
        match rule.execute(&bom) {
            Ok(()) => tracing::info!("Rule {} passed", rule.name()),
            Err(failure) => {
                tracing::error!("Rule {} failed with {} violations", rule.name(), failure.messages().len());
                failures.push((rule.name(), failure));
            }
        }
    }

    Ok(Verdict { bom, failures })
}

/// Instantiate the configured rules, in order.
pub fn create_rules(registry: &RuleRegistry, entries: &[RuleEntry]) -> Result<Vec<Box<dyn EnforcerRule>>> {
    entries
        .iter()
        .map(|entry| registry.create(&entry.name, &entry.options))
        .collect()
}

/// Describe an artifact file and its BOM files as a builder request.
///
/// The coordinate of the build is read from the main component of the first
/// BOM. When it carries no usable identifier, the artifact file name is used.
pub fn request_from_files(artifact: &Path, boms: &[PathBuf]) -> Result<BomBuilderRequest> {
    let (main_path, other_paths) = boms
        .split_first()
        .ok_or_else(|| EnforcerError::config("at least one BOM file is required"))?;

    let main_format = format_of(main_path)?;
    let document = CycloneDxParser::new().parse_file(main_path, main_format)?;
    let project = document
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.component.as_ref())
        .and_then(|component| package_identifier(component).ok())
        .map_or_else(|| coordinate_from_file(artifact), |purl| purl.to_coordinate());

    let extension = artifact
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or(project.extension())
        .to_string();
    let artifact_coordinate = project
        .with_extension(extension)
        .with_file(Some(artifact.to_path_buf()));

    let bom_coordinate = |path: &Path, format: BomFormat| {
        project
            .with_classifier(CYCLONEDX_CLASSIFIER)
            .with_extension(format.extension())
            .with_file(Some(path.to_path_buf()))
    };

    let mut request =
        BomBuilderRequest::new(artifact_coordinate, bom_coordinate(main_path, main_format));
    for path in other_paths {
        request = request.with_bill_of_materials(bom_coordinate(path, format_of(path)?));
    }
    Ok(request)
}

fn format_of(path: &Path) -> Result<BomFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("xml") => Ok(BomFormat::Xml),
        Some("json") => Ok(BomFormat::Json),
        other => Err(EnforcerError::structure(
            format!("BOM file {}", path.display()),
            StructureErrorKind::UnsupportedFormat(other.unwrap_or_default().to_string()),
        )),
    }
}

fn coordinate_from_file(artifact: &Path) -> ArtifactCoordinate {
    let name = artifact
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    ArtifactCoordinate::new("", name, "", "jar")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CycloneDxBomBuilder;
    use crate::model::Component;
    use crate::resolver::NoOpResolver;
    use tempfile::TempDir;

    const MAIN_BOM: &str = r#"{
  "bomFormat": "CycloneDX",
  "specVersion": "1.5",
  "metadata": {
    "component": {
      "type": "library",
      "name": "app",
      "purl": "pkg:maven/org.example/app@1.0"
    }
  },
  "components": []
}"#;

    struct AlwaysFails;

    impl EnforcerRule for AlwaysFails {
        fn name(&self) -> &'static str {
            "alwaysFails"
        }

        fn execute(&self, bom: &BillOfMaterials) -> std::result::Result<(), VerificationFailure> {
            Err(VerificationFailure::new(
                format!("SBOM {} is rejected", bom.document_label()),
                vec!["b".to_string(), "a".to_string()],
            ))
        }
    }

    struct AlwaysPasses;

    impl EnforcerRule for AlwaysPasses {
        fn name(&self) -> &'static str {
            "alwaysPasses"
        }

        fn execute(&self, _bom: &BillOfMaterials) -> std::result::Result<(), VerificationFailure> {
            Ok(())
        }
    }

    fn write_files(dir: &TempDir) -> (PathBuf, PathBuf) {
        let artifact = dir.path().join("app-1.0.jar");
        let bom = dir.path().join("app-1.0-cyclonedx.json");
        std::fs::write(&artifact, b"content").unwrap();
        std::fs::write(&bom, MAIN_BOM).unwrap();
        (artifact, bom)
    }

    #[test]
    fn test_request_from_files() {
        let dir = TempDir::new().unwrap();
        let (artifact, bom) = write_files(&dir);

        let request = request_from_files(&artifact, &[bom.clone()]).unwrap();
        assert_eq!(request.artifact().to_string(), "org.example:app:jar:1.0");
        assert_eq!(request.artifact().file(), Some(artifact.as_path()));
        assert_eq!(
            request.main_bill_of_materials().to_string(),
            "org.example:app:json:cyclonedx:1.0"
        );
        assert_eq!(request.main_bill_of_materials().file(), Some(bom.as_path()));
        assert_eq!(request.all_bills_of_materials().len(), 1);
    }

    #[test]
    fn test_request_requires_bom() {
        let result = request_from_files(Path::new("app.jar"), &[]);
        assert!(matches!(result, Err(EnforcerError::Config(_))));
    }

    #[test]
    fn test_request_rejects_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let bom = dir.path().join("bom.spdx");
        std::fs::write(&bom, "SPDXVersion: SPDX-2.3").unwrap();

        let err = request_from_files(Path::new("app.jar"), &[bom]).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_verify_collects_every_failure() {
        let dir = TempDir::new().unwrap();
        let (artifact, bom) = write_files(&dir);
        let request = request_from_files(&artifact, &[bom]).unwrap();
        let rules: Vec<Box<dyn EnforcerRule>> =
            vec![Box::new(AlwaysFails), Box::new(AlwaysPasses), Box::new(AlwaysFails)];

        let verdict = verify(&CycloneDxBomBuilder::new(), &NoOpResolver, &request, &rules).unwrap();
        assert!(!verdict.passed());
        assert_eq!(verdict.exit_code(), exit_codes::VERIFICATION_FAILED);
        assert_eq!(verdict.failures().len(), 2);
        assert_eq!(verdict.failures()[0].1.messages(), ["a", "b"]);
        assert_eq!(verdict.bom().dependencies().len(), 0);
    }

    #[test]
    fn test_verify_without_rules_passes() {
        let dir = TempDir::new().unwrap();
        let (artifact, bom) = write_files(&dir);
        let request = request_from_files(&artifact, &[bom]).unwrap();

        let verdict = verify(&CycloneDxBomBuilder::new(), &NoOpResolver, &request, &[]).unwrap();
        assert!(verdict.passed());
        assert_eq!(verdict.exit_code(), exit_codes::SUCCESS);
        let main: &Component = verdict.bom().component();
        assert_eq!(main.artifact().file(), Some(artifact.as_path()));
    }

    #[test]
    fn test_verify_rejects_unsupported_bom() {
        let artifact = ArtifactCoordinate::new("g", "app", "1.0", "jar");
        let bom = ArtifactCoordinate::new("g", "app", "1.0", "spdx.json");
        let request = BomBuilderRequest::new(artifact, bom);

        let err = verify(&CycloneDxBomBuilder::new(), &NoOpResolver, &request, &[]).unwrap_err();
        assert!(matches!(
            err,
            EnforcerError::Structure {
                source: StructureErrorKind::NotABom,
                ..
            }
        ));
    }

    #[test]
    fn test_create_rules() {
        let entries = vec![RuleEntry::new("checksum"), RuleEntry::new("validateReferences")];
        let rules = create_rules(&RuleRegistry::with_defaults(), &entries).unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["checksum", "validateReferences"]);

        let unknown = create_rules(&RuleRegistry::with_defaults(), &[RuleEntry::new("nope")]);
        assert!(unknown.is_err());
    }
}
