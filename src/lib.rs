//! **Verification of build artifacts against their CycloneDX SBOM.**
//!
//! `sbom-enforcer` reads the CycloneDX bill of materials attached to a build,
//! resolves every dependency it declares from a Maven-layout repository, and
//! runs integrity rules over the resulting component graph.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: The normalized graph, [`BillOfMaterials`], made of
//!   [`Component`]s identified by [`ArtifactCoordinate`]s.
//! - **[`parsers`]**: Decodes CycloneDX XML and JSON documents.
//! - **[`builder`]**: Turns a document into a [`BillOfMaterials`], resolving
//!   dependencies and their own BOMs through an [`ArtifactResolver`].
//! - **[`resolver`]**: The resolution capability and a Maven repository
//!   implementation backed by a local repository directory.
//! - **[`rules`]**: The `checksum` and `validateReferences` rules.
//! - **[`pipeline`]**: Builds the graph once and runs every configured rule.
//! - **[`config`]**: YAML configuration with discovery and CLI overrides.
//!
//! ## Getting Started
//!
//! ```no_run
//! use sbom_enforcer::builder::CycloneDxBomBuilder;
//! use sbom_enforcer::pipeline::{request_from_files, verify};
//! use sbom_enforcer::resolver::{MavenRepositoryResolver, MavenResolverConfig};
//! use sbom_enforcer::rules::{ChecksumRule, EnforcerRule};
//! use std::path::{Path, PathBuf};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = request_from_files(
//!         Path::new("target/app-1.0.jar"),
//!         &[PathBuf::from("target/app-1.0-cyclonedx.json")],
//!     )?;
//!     let resolver = MavenRepositoryResolver::new(MavenResolverConfig::default())?;
//!     let rules: Vec<Box<dyn EnforcerRule>> = vec![Box::new(ChecksumRule::new())];
//!
//!     let verdict = verify(&CycloneDxBomBuilder::new(), &resolver, &request, &rules)?;
//!     for (rule, failure) in verdict.failures() {
//!         println!("[{rule}] {failure}");
//!     }
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod parsers;
pub mod pipeline;
pub mod resolver;
pub mod rules;

// Re-export main types for convenience
pub use builder::{BomBuilder, CycloneDxBomBuilder};
pub use config::{ConfigError, EnforcerConfig, Validatable};
pub use error::{EnforcerError, ErrorContext, OptionContext, Result, VerificationFailure};
pub use model::{
    ArtifactCoordinate, BillOfMaterials, BomBuilderRequest, ChecksumAlgorithm, Component,
    ExternalReference, PackageIdentifier,
};
pub use pipeline::{verify, Verdict};
pub use resolver::{ArtifactResolver, MavenRepositoryResolver, RemoteRepository};
pub use rules::{ChecksumRule, EnforcerRule, RuleRegistry, ValidateReferencesRule};
