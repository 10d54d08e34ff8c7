//! The component graph produced by a BOM builder.

use super::component::Component;
use super::coordinate::{ArtifactCoordinate, CoordinateKey};
use crate::error::{EnforcerError, Result, StructureErrorKind};
use std::collections::BTreeMap;
use std::fmt;

/// Canonical, immutable graph: one main component plus its dependencies.
///
/// Dependencies are deduplicated and ordered by their artifact coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillOfMaterials {
    bill_of_materials: ArtifactCoordinate,
    component: Component,
    dependencies: BTreeMap<CoordinateKey, Component>,
    diagnostics: Vec<BuildDiagnostic>,
}

impl BillOfMaterials {
    /// Start building a graph for the given BOM document.
    pub fn builder(bill_of_materials: ArtifactCoordinate) -> BillOfMaterialsBuilder {
        BillOfMaterialsBuilder {
            bill_of_materials,
            component: None,
            dependencies: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// The BOM document this graph was built from
    #[must_use]
    pub fn bill_of_materials(&self) -> &ArtifactCoordinate {
        &self.bill_of_materials
    }

    /// The component described by the document
    #[must_use]
    pub fn component(&self) -> &Component {
        &self.component
    }

    /// Dependencies in coordinate order
    pub fn dependencies(&self) -> impl ExactSizeIterator<Item = &Component> {
        self.dependencies.values()
    }

    /// Main component followed by every dependency
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        std::iter::once(&self.component).chain(self.dependencies.values())
    }

    /// Degradations recorded while the graph was built
    #[must_use]
    pub fn diagnostics(&self) -> &[BuildDiagnostic] {
        &self.diagnostics
    }

    /// Location of the BOM document for messages: its file, else its coordinate.
    #[must_use]
    pub fn document_label(&self) -> String {
        self.bill_of_materials.file().map_or_else(
            || self.bill_of_materials.to_string(),
            |file| file.display().to_string(),
        )
    }
}

/// Accumulates the parts of a [`BillOfMaterials`].
#[derive(Debug)]
pub struct BillOfMaterialsBuilder {
    bill_of_materials: ArtifactCoordinate,
    component: Option<Component>,
    dependencies: BTreeMap<CoordinateKey, Component>,
    diagnostics: Vec<BuildDiagnostic>,
}

impl BillOfMaterialsBuilder {
    pub fn component(&mut self, component: Component) -> &mut Self {
        self.component = Some(component);
        self
    }

    /// Adds a dependency unless one with the same coordinate is present.
    ///
    /// Returns `false` if the dependency was a duplicate.
    pub fn add_dependency(&mut self, dependency: Component) -> bool {
        let key = dependency.artifact().key();
        if self.dependencies.contains_key(&key) {
            tracing::debug!("Duplicate dependency {} ignored", dependency.artifact());
            return false;
        }
        self.dependencies.insert(key, dependency);
        true
    }

    /// Adds a dependency, replacing any with the same coordinate.
    pub fn replace_dependency(&mut self, dependency: Component) -> &mut Self {
        self.dependencies.insert(dependency.artifact().key(), dependency);
        self
    }

    pub fn add_diagnostic(&mut self, diagnostic: BuildDiagnostic) -> &mut Self {
        self.diagnostics.push(diagnostic);
        self
    }

    /// Finish the graph; fails if no main component was set.
    pub fn build(self) -> Result<BillOfMaterials> {
        let component = self.component.ok_or_else(|| {
            EnforcerError::structure(
                format!("BOM artifact {}", self.bill_of_materials),
                StructureErrorKind::MissingMainComponent,
            )
        })?;
        Ok(BillOfMaterials {
            bill_of_materials: self.bill_of_materials,
            component,
            dependencies: self.dependencies,
            diagnostics: self.diagnostics,
        })
    }
}

/// A non-fatal problem met while building the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDiagnostic {
    /// Label of the affected component
    pub component: String,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Category of a [`BuildDiagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The dependency artifact could not be resolved; the node has no local file
    ArtifactUnresolved,
    /// Looking up the dependency's own BOM failed for a reason other than absence
    BomLookupFailed,
    /// The dependency entry was unusable and left out of the graph
    ComponentSkipped,
}

impl fmt::Display for BuildDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DiagnosticKind::ArtifactUnresolved => "unresolved artifact",
            DiagnosticKind::BomLookupFailed => "BOM lookup failed",
            DiagnosticKind::ComponentSkipped => "component skipped",
        };
        write!(f, "{} ({kind}): {}", self.component, self.message)
    }
}

/// Input of a BOM builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BomBuilderRequest {
    artifact: ArtifactCoordinate,
    main_bill_of_materials: ArtifactCoordinate,
    all_bills_of_materials: Vec<ArtifactCoordinate>,
}

impl BomBuilderRequest {
    /// Create a request; the main BOM is always one of the attached BOMs.
    pub fn new(artifact: ArtifactCoordinate, main_bill_of_materials: ArtifactCoordinate) -> Self {
        Self {
            artifact,
            all_bills_of_materials: vec![main_bill_of_materials.clone()],
            main_bill_of_materials,
        }
    }

    /// Record another BOM attached to the build.
    #[must_use]
    pub fn with_bill_of_materials(mut self, bom: ArtifactCoordinate) -> Self {
        if !self.all_bills_of_materials.iter().any(|b| b.key() == bom.key()) {
            self.all_bills_of_materials.push(bom);
        }
        self
    }

    /// The main project artifact
    #[must_use]
    pub fn artifact(&self) -> &ArtifactCoordinate {
        &self.artifact
    }

    /// The BOM document to parse
    #[must_use]
    pub fn main_bill_of_materials(&self) -> &ArtifactCoordinate {
        &self.main_bill_of_materials
    }

    /// Every BOM attached to the build
    #[must_use]
    pub fn all_bills_of_materials(&self) -> &[ArtifactCoordinate] {
        &self.all_bills_of_materials
    }
}
