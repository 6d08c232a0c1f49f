//! Preflight checks for challenge generation.
//!
//! Run with `ctfgen preflight` to verify the container build tool and the
//! template directory before a run.

mod host_tools;
mod templates;
mod types;

use anyhow::{bail, Result};

pub use types::{CheckResult, CheckStatus, PreflightReport};

use crate::config::Config;

/// Run all preflight checks.
pub fn run_preflight(config: &Config) -> PreflightReport {
    let mut checks = Vec::new();

    println!("Running preflight checks...\n");

    println!("Checking host tools...");
    checks.push(host_tools::check_builder(&config.builder));

    println!("Checking templates...");
    checks.extend(templates::check_templates(&config.templates_dir));

    println!();

    PreflightReport { checks }
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(config: &Config) -> Result<()> {
    let report = run_preflight(config);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before generating.",
            report.fail_count()
        );
    }

    println!("All preflight checks passed!\n");
    Ok(())
}
