//! Verification rules run against a [`BillOfMaterials`].
//!
//! Every rule reports all of its findings at once, as a single
//! [`VerificationFailure`] with sorted messages.

pub mod checksum;
mod probe;
pub mod references;

pub use checksum::ChecksumRule;
pub use probe::{HttpProber, NetworkError, ReqwestProber};
pub use references::{ValidateReferencesConfig, ValidateReferencesRule, ValidationContext};

use crate::error::{EnforcerError, Result, VerificationFailure};
use crate::model::BillOfMaterials;
use std::collections::BTreeMap;

/// A check over the component graph.
pub trait EnforcerRule: Send + Sync {
    /// Name under which the rule is configured
    fn name(&self) -> &'static str;

    /// Run the rule; all violations are reported together.
    fn execute(&self, bom: &BillOfMaterials) -> std::result::Result<(), VerificationFailure>;
}

/// Creates a rule from its configuration options.
pub type RuleFactory = fn(&serde_yaml_ng::Value) -> Result<Box<dyn EnforcerRule>>;

/// Rule constructors, by configured name.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    factories: BTreeMap<&'static str, RuleFactory>,
}

impl RuleRegistry {
    /// An empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in rule.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(checksum::RULE_NAME, checksum::create);
        registry.register(references::RULE_NAME, references::create);
        registry
    }

    pub fn register(&mut self, name: &'static str, factory: RuleFactory) {
        self.factories.insert(name, factory);
    }

    /// Returns `true` if a rule of that name can be created.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered rule names, sorted
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Instantiate the rule registered under `name`.
    pub fn create(&self, name: &str, options: &serde_yaml_ng::Value) -> Result<Box<dyn EnforcerRule>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            EnforcerError::config(format!(
                "unknown rule `{name}` (available: {})",
                self.names().collect::<Vec<_>>().join(", ")
            ))
        })?;
        factory(options)
    }
}

/// Deserialize rule options; an absent value means every default.
pub(crate) fn rule_options<T>(name: &str, options: &serde_yaml_ng::Value) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if options.is_null() {
        return Ok(T::default());
    }
    serde_yaml_ng::from_value(options.clone())
        .map_err(|e| EnforcerError::config(format!("options of rule `{name}`: {e}")))
}
