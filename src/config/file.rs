//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::{CliOverrides, EnforcerConfig};
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".sbom-enforcer.yaml",
    ".sbom-enforcer.yml",
    "sbom-enforcer.yaml",
    "sbom-enforcer.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/sbom-enforcer/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    // 1. Use explicit path if provided
    if let Some(path) = explicit_path
        && path.exists()
    {
        return Some(path.to_path_buf());
    }

    // 2. Search current directory
    if let Ok(cwd) = std::env::current_dir()
        && let Some(path) = find_config_in_dir(&cwd)
    {
        return Some(path);
    }

    // 3. Search git root (if in a repo)
    if let Some(git_root) = find_git_root()
        && let Some(path) = find_config_in_dir(&git_root)
    {
        return Some(path);
    }

    // 4. Search user config directory
    if let Some(config_dir) = dirs::config_dir()
        && let Some(path) = find_config_in_dir(&config_dir.join("sbom-enforcer"))
    {
        return Some(path);
    }

    // 5. Search home directory
    if let Some(home) = dirs::home_dir()
        && let Some(path) = find_config_in_dir(&home)
    {
        return Some(path);
    }

    None
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml_ng::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml_ng::Error> for ConfigFileError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `EnforcerConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<EnforcerConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: EnforcerConfig = serde_yaml_ng::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (EnforcerConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (EnforcerConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (EnforcerConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl EnforcerConfig {
    /// Apply command line settings over this configuration.
    pub fn merge(&mut self, overrides: &CliOverrides) {
        if let Some(ref local_repository) = overrides.local_repository {
            self.repository.local_repository.clone_from(local_repository);
        }
        if overrides.offline {
            self.repository.offline = true;
        }
    }

    /// Load from an explicit or discovered file and merge with CLI overrides.
    ///
    /// An explicit path must exist and parse; a discovered file that fails to
    /// load is skipped with a warning.
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        overrides: &CliOverrides,
    ) -> Result<(Self, Option<PathBuf>), ConfigFileError> {
        let (mut config, loaded_from) = match config_path {
            Some(path) => (load_config_file(path)?, Some(path.to_path_buf())),
            None => load_or_default(None),
        };
        config.merge(overrides);
        Ok((config, loaded_from))
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_example_config() -> String {
    r"# sbom-enforcer configuration
# ===========================
#
# Place this file at:
#   - .sbom-enforcer.yaml in your project root
#   - ~/.config/sbom-enforcer/sbom-enforcer.yaml for global config
#
# CLI arguments always override file settings.

# Artifact resolution
repository:
  # Local repository in Maven 2 layout
  # local_repository: ~/.m2/repository
  # Mirror of the default registry
  # central_mirror: https://mirror.example.com/maven2
  # Only use the local repository
  offline: false
  # Download timeout in seconds
  timeout_secs: 30

# Rules, run in order
rules:
  # Declared checksums must match the artifact files
  - name: checksum

  # External references must be reachable
  - name: validateReferences
    options:
      # Fail on 401 and 403 responses
      failOnAuth: false
      # Fail on 301 and 302 responses
      failOnRedirect: false
      # Check the references of dependencies
      checkDependencies: true
      # Fail on broken dependency references instead of warning
      failOnDependencies: false
      # Connection failures after which a host is skipped
      maxFailuresPerHost: 3
      # Request timeout in milliseconds
      timeoutMs: 5000
      # Reference types to check (empty: all)
      includes: []
      # Reference types never checked
      excludes: [distribution-intake]
"
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================
