//! Configuration module for sbom-enforcer.
//!
//! This module provides:
//! - Configuration structures for artifact resolution and rules
//! - Validation of configuration values, including rule options
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sbom_enforcer::config::{EnforcerConfig, CliOverrides};
//!
//! // Use defaults (checksum rule only)
//! let config = EnforcerConfig::default();
//!
//! // Use builder
//! let config = EnforcerConfig::builder()
//!     .offline(true)
//!     .rule("checksum")
//!     .rule("validateReferences")
//!     .build();
//!
//! // Load from file
//! let (config, loaded_from) =
//!     EnforcerConfig::from_file_with_overrides(None, &CliOverrides::default())?;
//! ```
//!
//! # Configuration File
//!
//! Place a `.sbom-enforcer.yaml` file in your project root or `~/.config/sbom-enforcer/`:
//!
//! ```yaml
//! repository:
//!   offline: true
//! rules:
//!   - name: checksum
//!   - name: validateReferences
//!     options:
//!       failOnDependencies: true
//! ```

pub mod file;
mod types;
mod validation;

pub use types::{
    CliOverrides, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_RULE, EnforcerConfig,
    EnforcerConfigBuilder, RepositoryConfig, RuleEntry,
};
pub use validation::{ConfigError, Validatable};

// Re-export file utilities
pub use file::{
    ConfigFileError, discover_config_file, generate_example_config, load_config_file,
    load_or_default,
};
