//! CycloneDX document parsing.
//!
//! Documents are decoded into a [`CdxDocument`] tree which the BOM builder
//! then normalizes into the component graph. The serialization is chosen
//! from the artifact extension (`xml` or `json`); any other extension is
//! rejected before the file is opened.
//!
//! ## Usage
//!
//! ```no_run
//! use sbom_enforcer::model::ArtifactCoordinate;
//! use sbom_enforcer::parsers::parse_bill_of_materials;
//! use std::path::PathBuf;
//!
//! let bom = ArtifactCoordinate::new("org.example", "app", "1.0", "xml")
//!     .with_classifier("cyclonedx")
//!     .with_file(Some(PathBuf::from("target/app-1.0-cyclonedx.xml")));
//! let document = parse_bill_of_materials(&bom).unwrap();
//! println!("{} dependencies", document.components.len());
//! ```

mod cyclonedx;

pub use cyclonedx::{
    BomFormat, CdxComponent, CdxDocument, CdxExternalReference, CdxHash, CdxMetadata,
    CycloneDxParser, CYCLONEDX_CLASSIFIER,
};

use crate::error::Result;
use crate::model::ArtifactCoordinate;

/// Parse the document attached to a resolved BOM artifact.
pub fn parse_bill_of_materials(artifact: &ArtifactCoordinate) -> Result<CdxDocument> {
    CycloneDxParser::new().parse_artifact(artifact)
}
