//! Builder for CycloneDX documents.

use super::BomBuilder;
use crate::error::{
    EnforcerError, ErrorContext, IdentifierErrorKind, OptionContext, Result, StructureErrorKind,
};
use crate::model::{
    ArtifactCoordinate, BillOfMaterials, BomBuilderRequest, BuildDiagnostic, ChecksumAlgorithm,
    Component, ComponentBuilder, CoordinateKey, DiagnosticKind, ExternalReference,
    PackageIdentifier,
};
use crate::parsers::{BomFormat, CdxComponent, CycloneDxParser, CYCLONEDX_CLASSIFIER};
use crate::resolver::{ArtifactResolver, RemoteRepository};
use rayon::prelude::*;
use std::collections::HashSet;

/// Creates a [`BillOfMaterials`] from a CycloneDX document.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycloneDxBomBuilder {
    parser: CycloneDxParser,
}

/// A dependency whose declaration was processed, before resolution.
struct PendingDependency {
    label: String,
    artifact: ArtifactCoordinate,
    builder: ComponentBuilder,
}

/// A resolved dependency and what went wrong while resolving it.
struct ResolvedDependency {
    component: Component,
    diagnostics: Vec<BuildDiagnostic>,
}

impl CycloneDxBomBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: CycloneDxParser::new(),
        }
    }

    fn process_main_component(
        component: &CdxComponent,
        request: &BomBuilderRequest,
    ) -> Result<Component> {
        let purl = package_identifier(component)?;
        let artifact = purl
            .to_coordinate()
            .with_file(request.artifact().file().map(Into::into));
        let mut builder = Component::builder(artifact);
        for bom in request.all_bills_of_materials() {
            builder.add_bill_of_materials(bom.clone());
        }
        process_generic_component(&mut builder, component)?;
        Ok(builder.build())
    }

    /// Process the declarations of every dependency, skipping unusable ones.
    ///
    /// Only the first declaration of a coordinate is kept.
    fn pending_dependencies(
        components: &[CdxComponent],
        diagnostics: &mut Vec<BuildDiagnostic>,
    ) -> Vec<PendingDependency> {
        let mut seen: HashSet<CoordinateKey> = HashSet::new();
        let mut pending = Vec::with_capacity(components.len());

        for component in components {
            let prepared = package_identifier(component).and_then(|purl| {
                let artifact = purl.to_coordinate();
                let mut builder = Component::builder(artifact.clone());
                process_generic_component(&mut builder, component)?;
                Ok((artifact, builder))
            });
            match prepared {
                Ok((artifact, builder)) => {
                    if seen.insert(artifact.key()) {
                        pending.push(PendingDependency {
                            label: component.to_string(),
                            artifact,
                            builder,
                        });
                    } else {
                        tracing::debug!("Duplicate dependency {} ignored", artifact);
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping dependency {}: {}", component, e);
                    diagnostics.push(BuildDiagnostic {
                        component: component.to_string(),
                        kind: DiagnosticKind::ComponentSkipped,
                        message: e.to_string(),
                    });
                }
            }
        }
        pending
    }

    fn resolve_dependency(
        resolver: &dyn ArtifactResolver,
        dependency: PendingDependency,
    ) -> ResolvedDependency {
        let PendingDependency {
            label,
            artifact,
            mut builder,
        } = dependency;
        let repository = RemoteRepository::for_coordinate(&artifact);
        let mut diagnostics = Vec::new();

        match resolver.resolve(&artifact, &repository) {
            Ok(resolved) => {
                builder.artifact(resolved);
            }
            Err(e) => {
                // Usual for aggregate BOMs and modules of the current build
                tracing::warn!("Failed to download artifact {}: {}", artifact, e);
                diagnostics.push(BuildDiagnostic {
                    component: label.clone(),
                    kind: DiagnosticKind::ArtifactUnresolved,
                    message: e.to_string(),
                });
            }
        }

        for bom in Self::find_bom_artifacts(resolver, &artifact, &repository, &label, &mut diagnostics) {
            builder.add_bill_of_materials(bom);
        }

        ResolvedDependency {
            component: builder.build(),
            diagnostics,
        }
    }

    /// Look up the BOM documents published next to an artifact, one per format.
    fn find_bom_artifacts(
        resolver: &dyn ArtifactResolver,
        artifact: &ArtifactCoordinate,
        repository: &RemoteRepository,
        label: &str,
        diagnostics: &mut Vec<BuildDiagnostic>,
    ) -> Vec<ArtifactCoordinate> {
        let candidate = artifact.with_file(None).with_classifier(CYCLONEDX_CLASSIFIER);
        let mut found = Vec::new();

        for format in BomFormat::ALL {
            let bom = candidate.with_extension(format.extension());
            match resolver.resolve(&bom, repository) {
                Ok(resolved) => found.push(resolved),
                Err(e) if e.is_not_found() => {
                    tracing::debug!("No {} BOM published for {}", format, artifact);
                }
                Err(e) => {
                    tracing::warn!("Failed to look up BOM {}: {}", bom, e);
                    diagnostics.push(BuildDiagnostic {
                        component: label.to_string(),
                        kind: DiagnosticKind::BomLookupFailed,
                        message: e.to_string(),
                    });
                }
            }
        }
        found
    }
}

impl BomBuilder for CycloneDxBomBuilder {
    fn is_supported(&self, bill_of_materials: &ArtifactCoordinate) -> bool {
        bill_of_materials.classifier() == Some(CYCLONEDX_CLASSIFIER)
    }

    fn build(
        &self,
        resolver: &dyn ArtifactResolver,
        request: &BomBuilderRequest,
    ) -> Result<BillOfMaterials> {
        let main_bom = request.main_bill_of_materials();
        let document = self.parser.parse_artifact(main_bom)?;

        let context = format!("BOM artifact {main_bom}");
        let metadata = document
            .metadata
            .as_ref()
            .or_structure(&context, StructureErrorKind::MissingMetadata)?;
        let main_component = metadata
            .component
            .as_ref()
            .or_structure(&context, StructureErrorKind::MissingMainComponent)?;

        let component = Self::process_main_component(main_component, request)
            .with_context(|| format!("main component of {context}"))?;

        let mut diagnostics = Vec::new();
        let pending = Self::pending_dependencies(&document.components, &mut diagnostics);
        let resolved: Vec<ResolvedDependency> = pending
            .into_par_iter()
            .map(|dependency| Self::resolve_dependency(resolver, dependency))
            .collect();

        let mut builder = BillOfMaterials::builder(main_bom.clone());
        builder.component(component);
        for dependency in resolved {
            builder.add_dependency(dependency.component);
            diagnostics.extend(dependency.diagnostics);
        }
        for diagnostic in diagnostics {
            builder.add_diagnostic(diagnostic);
        }
        let bom = builder.build()?;

        tracing::info!(
            "Built BOM {} with {} dependencies ({} degraded)",
            bom.document_label(),
            bom.dependencies().len(),
            bom.diagnostics().len()
        );
        Ok(bom)
    }
}

/// Package identifier of a component.
///
/// An explicit `purl` is parsed; otherwise a Maven identifier is derived from
/// the group, name and version. A component with neither cannot be identified.
pub fn package_identifier(component: &CdxComponent) -> Result<PackageIdentifier> {
    let context = || format!("component {component}");
    match (&component.purl, &component.group) {
        (Some(purl), _) => PackageIdentifier::parse(purl).map_err(|e| {
            EnforcerError::identifier(
                context(),
                IdentifierErrorKind::Invalid {
                    purl: purl.clone(),
                    reason: e.to_string(),
                },
            )
        }),
        (None, Some(group)) => {
            PackageIdentifier::maven(group, &component.name, component.version.as_deref()).map_err(
                |e| {
                    EnforcerError::identifier(
                        context(),
                        IdentifierErrorKind::Invalid {
                            purl: format!("{group}:{}", component.name),
                            reason: e.to_string(),
                        },
                    )
                },
            )
        }
        (None, None) => Err(EnforcerError::identifier(
            context(),
            IdentifierErrorKind::Missing,
        )),
    }
}

/// Copy identifier, checksums and external references of a document
/// component into a model component.
///
/// A checksum with an unrecognized algorithm fails the component.
pub fn process_generic_component(
    builder: &mut ComponentBuilder,
    component: &CdxComponent,
) -> Result<()> {
    builder.purl(package_identifier(component)?);
    for hash in &component.hashes {
        let algorithm = ChecksumAlgorithm::from_cyclonedx(&hash.alg).ok_or_else(|| {
            EnforcerError::UnknownChecksumAlgorithm {
                component: component.to_string(),
                algorithm: hash.alg.clone(),
            }
        })?;
        builder.add_checksum(algorithm, hash.content.clone());
    }
    for reference in &component.external_references {
        builder.add_external_reference(ExternalReference::new(
            reference.ref_type.clone(),
            reference.url.clone(),
        ));
    }
    Ok(())
}
