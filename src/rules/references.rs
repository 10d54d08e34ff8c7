//! Reachability of external references.
//!
//! Every `http`/`https` reference is probed with a `HEAD` request. Results
//! are cached per URL for the duration of one rule invocation, and a host
//! that keeps failing at the connection level is skipped once it reaches
//! `maxFailuresPerHost` failures (there is no recovery within a run).
//!
//! Hosts are checked in parallel; references to the same host are checked
//! one after the other so that the failure count is deterministic.

use super::probe::{HttpProber, ReqwestProber};
use super::{rule_options, EnforcerRule};
use crate::error::{EnforcerError, Result, VerificationFailure};
use crate::model::{BillOfMaterials, Component, ExternalReference};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use url::{ParseError, Url};

pub(crate) const RULE_NAME: &str = "validateReferences";

/// Reference type excluded unless configured otherwise.
pub const DISTRIBUTION_INTAKE: &str = "distribution-intake";

const HTTP_OK: u16 = 200;
const RESPONSE_CODES_AUTH: [u16; 2] = [401, 403];
const RESPONSE_CODES_REDIRECT: [u16; 2] = [301, 302];

/// Options of the reference rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidateReferencesConfig {
    /// Treat 401 and 403 responses as errors
    pub fail_on_auth: bool,
    /// Treat 301 and 302 responses as errors
    pub fail_on_redirect: bool,
    /// Also check the references of dependencies
    pub check_dependencies: bool,
    /// Fail on broken dependency references instead of logging them
    pub fail_on_dependencies: bool,
    /// Connection failures after which a host is no longer checked
    pub max_failures_per_host: u32,
    /// Timeout of each request, in milliseconds
    pub timeout_ms: u64,
    /// Reference types to check; empty means all
    pub includes: BTreeSet<String>,
    /// Reference types never checked
    pub excludes: BTreeSet<String>,
}

impl Default for ValidateReferencesConfig {
    fn default() -> Self {
        Self {
            fail_on_auth: false,
            fail_on_redirect: false,
            check_dependencies: true,
            fail_on_dependencies: false,
            max_failures_per_host: 3,
            timeout_ms: 5000,
            includes: BTreeSet::new(),
            excludes: BTreeSet::from([DISTRIBUTION_INTAKE.to_string()]),
        }
    }
}

impl ValidateReferencesConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns `true` if references of this type are checked.
    #[must_use]
    pub fn should_check(&self, reference: &ExternalReference) -> bool {
        let reference_type = reference.reference_type();
        (self.includes.is_empty() || self.includes.contains(reference_type))
            && !self.excludes.contains(reference_type)
    }
}

pub(crate) fn create(options: &serde_yaml_ng::Value) -> Result<Box<dyn EnforcerRule>> {
    let config: ValidateReferencesConfig = rule_options(RULE_NAME, options)?;
    Ok(Box::new(ValidateReferencesRule::new(config)?))
}

/// State shared by all reference checks of one rule invocation.
pub struct ValidationContext<'a> {
    config: &'a ValidateReferencesConfig,
    prober: &'a dyn HttpProber,
    failures_by_host: Mutex<HashMap<String, u32>>,
    response_codes: Mutex<HashMap<String, u16>>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(config: &'a ValidateReferencesConfig, prober: &'a dyn HttpProber) -> Self {
        Self {
            config,
            prober,
            failures_by_host: Mutex::new(HashMap::new()),
            response_codes: Mutex::new(HashMap::new()),
        }
    }

    /// Connection failures recorded so far for an authority (`host[:port]`).
    #[must_use]
    pub fn failure_count(&self, authority: &str) -> u32 {
        self.failures_by_host
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(authority)
            .copied()
            .unwrap_or(0)
    }

    /// Check one reference location; returns an error message if it is broken.
    ///
    /// Locations that are not `http`/`https` URLs are not checked.
    pub fn validate_reference(&self, location: &str) -> Option<String> {
        let url = match Url::parse(location) {
            Ok(url) => url,
            // A relative reference has no scheme and is not checked
            Err(ParseError::RelativeUrlWithoutBase) if is_uri_reference(location) => return None,
            Err(_) => return Some(format!("Reference location is not a valid URI: {location}")),
        };
        let authority = match url.scheme() {
            "http" | "https" => authority(&url),
            _ => return None,
        };

        if self.failure_count(&authority) >= self.config.max_failures_per_host {
            tracing::debug!("Maximum IO errors reached for host: {}", authority);
            return None;
        }

        let cached = self
            .response_codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url.as_str())
            .copied();
        let response_code = match cached {
            Some(code) => {
                tracing::debug!("Using cached response for URL: {}", url);
                code
            }
            None => match self.prober.head(&url, self.config.timeout()) {
                Ok(code) => {
                    self.response_codes
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(url.as_str().to_string(), code);
                    code
                }
                Err(e) => {
                    tracing::debug!("Connection failure: {}", e);
                    *self
                        .failures_by_host
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .entry(authority)
                        .or_insert(0) += 1;
                    return Some(format!("Failed to connect to URL: {location}"));
                }
            },
        };

        let tolerated = response_code == HTTP_OK
            || (!self.config.fail_on_auth && RESPONSE_CODES_AUTH.contains(&response_code))
            || (!self.config.fail_on_redirect && RESPONSE_CODES_REDIRECT.contains(&response_code));
        (!tolerated).then(|| format!("Broken external reference ({response_code}): {location}"))
    }
}

/// Returns `true` if the location only uses characters allowed in a URI
/// reference, with well-formed percent escapes.
fn is_uri_reference(location: &str) -> bool {
    const ALLOWED: &str = "-._~:/?#[]@!$&'()*+,;=";
    let mut chars = location.chars();
    while let Some(c) = chars.next() {
        let valid = match c {
            '%' => chars.next().is_some_and(|h| h.is_ascii_hexdigit())
                && chars.next().is_some_and(|l| l.is_ascii_hexdigit()),
            c if c.is_ascii() => c.is_ascii_alphanumeric() || ALLOWED.contains(c),
            c => !c.is_control() && !c.is_whitespace(),
        };
        if !valid {
            return false;
        }
    }
    true
}

/// `host[:port]` of a URL, the unit of circuit breaking.
fn authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// Authority used to schedule a check; locations that need no request share one group.
fn schedule_key(location: &str) -> String {
    Url::parse(location)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|url| authority(&url))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Main,
    Dependency,
}

/// Checks that external references of the components are reachable.
pub struct ValidateReferencesRule {
    config: ValidateReferencesConfig,
    prober: Arc<dyn HttpProber>,
}

impl ValidateReferencesRule {
    /// Create the rule with an HTTP prober honouring the configured timeout.
    pub fn new(config: ValidateReferencesConfig) -> Result<Self> {
        let prober = ReqwestProber::new(config.timeout())
            .map_err(|e| EnforcerError::config(e.message))?;
        Ok(Self::with_prober(config, Arc::new(prober)))
    }

    pub fn with_prober(config: ValidateReferencesConfig, prober: Arc<dyn HttpProber>) -> Self {
        Self { config, prober }
    }

    #[must_use]
    pub fn config(&self) -> &ValidateReferencesConfig {
        &self.config
    }

    /// A fresh context; circuit breakers and cache start empty.
    #[must_use]
    pub fn new_context(&self) -> ValidationContext<'_> {
        ValidationContext::new(&self.config, self.prober.as_ref())
    }

    fn checked_references<'b>(
        &self,
        component: &'b Component,
        origin: Origin,
    ) -> impl Iterator<Item = (Origin, &'b str)> {
        component
            .external_references()
            .filter(|reference| self.config.should_check(reference))
            .map(move |reference| (origin, reference.location()))
    }

    /// Validate every selected reference, grouped by authority.
    fn validate_all(&self, references: Vec<(Origin, &str)>) -> Vec<(Origin, String)> {
        let mut by_authority: BTreeMap<String, Vec<(Origin, &str)>> = BTreeMap::new();
        for (origin, location) in references {
            by_authority
                .entry(schedule_key(location))
                .or_default()
                .push((origin, location));
        }

        let context = self.new_context();
        by_authority
            .into_par_iter()
            .flat_map_iter(|(_, group)| {
                group
                    .into_iter()
                    .filter_map(|(origin, location)| {
                        context
                            .validate_reference(location)
                            .map(|message| (origin, message))
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

impl EnforcerRule for ValidateReferencesRule {
    fn name(&self) -> &'static str {
        RULE_NAME
    }

    fn execute(&self, bom: &BillOfMaterials) -> std::result::Result<(), VerificationFailure> {
        let mut references: Vec<(Origin, &str)> =
            self.checked_references(bom.component(), Origin::Main).collect();
        if self.config.check_dependencies {
            for dependency in bom.dependencies() {
                references.extend(self.checked_references(dependency, Origin::Dependency));
            }
        }

        let (mut errors, mut dependency_errors): (Vec<_>, Vec<_>) = self
            .validate_all(references)
            .into_iter()
            .partition(|(origin, _)| *origin == Origin::Main);

        if self.config.fail_on_dependencies {
            errors.append(&mut dependency_errors);
        } else {
            dependency_errors.sort_by(|a, b| a.1.cmp(&b.1));
            for (_, message) in &dependency_errors {
                tracing::warn!("{}", message);
            }
        }

        if errors.is_empty() {
            return Ok(());
        }
        Err(VerificationFailure::new(
            format!("SBOM {} contains invalid references", bom.bill_of_materials()),
            errors.into_iter().map(|(_, message)| message).collect(),
        ))
    }
}
