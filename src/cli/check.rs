//! Check command handler.
//!
//! Implements the `check` subcommand: build the component graph of an
//! artifact's BOM and run the configured rules against it.

use crate::builder::CycloneDxBomBuilder;
use crate::config::{EnforcerConfig, Validatable};
use crate::pipeline::{create_rules, exit_codes, request_from_files, verify, Verdict};
use crate::resolver::MavenRepositoryResolver;
use crate::rules::RuleRegistry;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Inputs of the check command.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// The built artifact
    pub artifact: PathBuf,
    /// BOM files of the artifact; the first one is verified
    pub boms: Vec<PathBuf>,
    /// Settings from the config file merged with CLI overrides
    pub enforcer: EnforcerConfig,
    /// Only print failures
    pub quiet: bool,
}

/// Run the check command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
pub fn run_check(config: &CheckConfig) -> Result<i32> {
    let errors = config.enforcer.validate();
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration:\n  {}", details.join("\n  "));
    }

    let rules = create_rules(&RuleRegistry::with_defaults(), &config.enforcer.rules)
        .context("Failed to create rules")?;
    let resolver = MavenRepositoryResolver::new(config.enforcer.repository.resolver_config())
        .context("Failed to create artifact resolver")?;
    let request = request_from_files(&config.artifact, &config.boms)
        .with_context(|| format!("Failed to read BOM for {}", config.artifact.display()))?;

    tracing::info!(
        "Verifying {} with {} rules",
        request.main_bill_of_materials(),
        rules.len()
    );
    let verdict = verify(&CycloneDxBomBuilder::new(), &resolver, &request, &rules)?;

    print_verdict(&verdict, rules.len(), config.quiet);
    Ok(verdict.exit_code())
}

fn print_verdict(verdict: &Verdict, rule_count: usize, quiet: bool) {
    for (rule, failure) in verdict.failures() {
        eprintln!("[{rule}] {failure}");
    }
    if quiet {
        return;
    }
    let bom = verdict.bom();
    for diagnostic in bom.diagnostics() {
        println!("  ! {diagnostic}");
    }
    if verdict.passed() {
        println!(
            "SBOM {}: {} rules passed ({} components)",
            bom.document_label(),
            rule_count,
            bom.components().count()
        );
    } else {
        println!(
            "SBOM {}: {} of {} rules failed",
            bom.document_label(),
            verdict.failures().len(),
            rule_count
        );
    }
}

/// Run the example-config command.
pub fn run_example_config() -> i32 {
    print!("{}", crate::config::generate_example_config());
    exit_codes::SUCCESS
}
