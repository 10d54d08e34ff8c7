//! Configuration types for sbom-enforcer.

use crate::resolver::MavenResolverConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Timeout of artifact downloads, in seconds.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Rule enabled when the configuration names none.
pub const DEFAULT_RULE: &str = "checksum";

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Top-level configuration, loaded from a config file and CLI arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnforcerConfig {
    /// Where artifacts are resolved from
    pub repository: RepositoryConfig,
    /// Rules to run, in order
    pub rules: Vec<RuleEntry>,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            repository: RepositoryConfig::default(),
            rules: vec![RuleEntry::new(DEFAULT_RULE)],
        }
    }
}

impl EnforcerConfig {
    /// Create a new `EnforcerConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `EnforcerConfig` builder.
    pub fn builder() -> EnforcerConfigBuilder {
        EnforcerConfigBuilder::default()
    }
}

// ============================================================================
// Builder for EnforcerConfig
// ============================================================================

/// Builder for constructing `EnforcerConfig` with fluent API.
///
/// Starts without any rule; the default rule only applies to loaded files.
#[derive(Debug)]
#[must_use]
pub struct EnforcerConfigBuilder {
    config: EnforcerConfig,
}

impl Default for EnforcerConfigBuilder {
    fn default() -> Self {
        Self {
            config: EnforcerConfig {
                repository: RepositoryConfig::default(),
                rules: Vec::new(),
            },
        }
    }
}

impl EnforcerConfigBuilder {
    /// Set the local repository directory.
    pub fn local_repository(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.repository.local_repository = path.into();
        self
    }

    /// Download from a mirror instead of the default registry.
    pub fn central_mirror(mut self, url: impl Into<String>) -> Self {
        self.config.repository.central_mirror = Some(url.into());
        self
    }

    /// Never contact remote repositories.
    pub const fn offline(mut self, offline: bool) -> Self {
        self.config.repository.offline = offline;
        self
    }

    /// Set the download timeout.
    pub const fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.repository.timeout_secs = secs;
        self
    }

    /// Enable a rule with its default options.
    pub fn rule(mut self, name: impl Into<String>) -> Self {
        self.config.rules.push(RuleEntry::new(name));
        self
    }

    /// Enable a rule with explicit options.
    pub fn rule_with_options(mut self, name: impl Into<String>, options: serde_yaml_ng::Value) -> Self {
        self.config.rules.push(RuleEntry {
            name: name.into(),
            options,
        });
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> EnforcerConfig {
        self.config
    }
}

// ============================================================================
// Repository Configuration
// ============================================================================

/// Artifact repository settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Local repository directory (default: `~/.m2/repository`)
    pub local_repository: PathBuf,
    /// Mirror used instead of the default registry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub central_mirror: Option<String>,
    /// Only use the local repository
    pub offline: bool,
    /// Timeout of a download, in seconds
    pub timeout_secs: u64,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        let defaults = MavenResolverConfig::default();
        Self {
            local_repository: defaults.local_repository,
            central_mirror: None,
            offline: false,
            timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

impl RepositoryConfig {
    /// Settings of the Maven resolver.
    #[must_use]
    pub fn resolver_config(&self) -> MavenResolverConfig {
        MavenResolverConfig {
            local_repository: self.local_repository.clone(),
            central_mirror: self.central_mirror.clone(),
            offline: self.offline,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

// ============================================================================
// Rule Configuration
// ============================================================================

/// A rule to run and its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Registered rule name, e.g. `checksum`
    pub name: String,
    /// Rule specific options; absent means defaults
    #[serde(default, skip_serializing_if = "serde_yaml_ng::Value::is_null")]
    pub options: serde_yaml_ng::Value,
}

impl RuleEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: serde_yaml_ng::Value::Null,
        }
    }
}

// ============================================================================
// CLI Overrides
// ============================================================================

/// Settings given on the command line, taking precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub local_repository: Option<PathBuf>,
    pub offline: bool,
}
