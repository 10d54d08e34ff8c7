//! Format-independent component graph.
//!
//! A CycloneDX document is normalized into a [`BillOfMaterials`]: one main
//! [`Component`] plus an ordered, deduplicated set of dependencies. Rules
//! only ever see this model, never the source document.
//!
//! ```ignore
//! let bom = builder.build(&resolver, &request)?;
//! for component in bom.components() {
//!     println!("{} -> {:?}", component.label(), component.artifact().file());
//! }
//! ```

mod bom;
mod component;
pub mod coordinate;
mod identifiers;

pub use bom::*;
pub use component::*;
pub use coordinate::{ArtifactCoordinate, CoordinateKey};
pub use identifiers::*;
