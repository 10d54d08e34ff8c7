//! Configuration validation for sbom-enforcer.

use super::types::{EnforcerConfig, RepositoryConfig, RuleEntry};
use crate::rules::checksum::ChecksumConfig;
use crate::rules::{rule_options, RuleRegistry, ValidateReferencesConfig};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for EnforcerConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = self.repository.validate();
        let registry = RuleRegistry::with_defaults();
        for (index, rule) in self.rules.iter().enumerate() {
            errors.extend(validate_rule(&registry, index, rule));
        }
        errors
    }
}

impl Validatable for RepositoryConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.local_repository.as_os_str().is_empty() {
            errors.push(ConfigError {
                field: "repository.local_repository".to_string(),
                message: "Local repository path must not be empty".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            errors.push(ConfigError {
                field: "repository.timeout_secs".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }
        if let Some(ref mirror) = self.central_mirror {
            if url::Url::parse(mirror).is_err() {
                errors.push(ConfigError {
                    field: "repository.central_mirror".to_string(),
                    message: format!("Invalid URL '{mirror}'"),
                });
            }
        }
        errors
    }
}

impl Validatable for ValidateReferencesConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.max_failures_per_host == 0 {
            errors.push(ConfigError {
                field: "maxFailuresPerHost".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }
        if self.timeout_ms == 0 {
            errors.push(ConfigError {
                field: "timeoutMs".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }
        errors
    }
}

fn validate_rule(registry: &RuleRegistry, index: usize, rule: &RuleEntry) -> Vec<ConfigError> {
    let field = format!("rules[{index}]");
    if !registry.contains(&rule.name) {
        return vec![ConfigError {
            field: format!("{field}.name"),
            message: format!(
                "Unknown rule '{}'. Valid options: {}",
                rule.name,
                registry.names().collect::<Vec<_>>().join(", ")
            ),
        }];
    }

    let options_error = |e: crate::error::EnforcerError| ConfigError {
        field: format!("{field}.options"),
        message: e.to_string(),
    };
    match rule.name.as_str() {
        "validateReferences" => {
            match rule_options::<ValidateReferencesConfig>(&rule.name, &rule.options) {
                Ok(options) => options
                    .validate()
                    .into_iter()
                    .map(|e| ConfigError {
                        field: format!("{field}.options.{}", e.field),
                        message: e.message,
                    })
                    .collect(),
                Err(e) => vec![options_error(e)],
            }
        }
        "checksum" => rule_options::<ChecksumConfig>(&rule.name, &rule.options)
            .err()
            .map(options_error)
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}
