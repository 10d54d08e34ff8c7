//! Construction of the component graph from a BOM document.

mod cyclonedx;

pub use cyclonedx::{package_identifier, process_generic_component, CycloneDxBomBuilder};

use crate::error::Result;
use crate::model::{ArtifactCoordinate, BillOfMaterials, BomBuilderRequest};
use crate::resolver::ArtifactResolver;

/// Turns a BOM document into a [`BillOfMaterials`].
///
/// # Example
///
/// ```ignore
/// let builder = CycloneDxBomBuilder::new();
/// if builder.is_supported(request.main_bill_of_materials()) {
///     let bom = builder.build(&resolver, &request)?;
///     println!("{} dependencies", bom.dependencies().len());
/// }
/// ```
pub trait BomBuilder: Send + Sync {
    /// Returns `true` if this builder understands the given BOM artifact.
    fn is_supported(&self, bill_of_materials: &ArtifactCoordinate) -> bool;

    /// Parse the main BOM of the request and resolve its dependencies.
    ///
    /// Structural problems with the document abort the build. Problems with a
    /// single dependency only degrade that dependency and are recorded as
    /// diagnostics of the result.
    fn build(
        &self,
        resolver: &dyn ArtifactResolver,
        request: &BomBuilderRequest,
    ) -> Result<BillOfMaterials>;
}
