//! Challenge generation pipeline.
//!
//! For each requested job a template is drawn at random (with replacement),
//! rendered with a fresh flag, built in a throwaway context by an
//! [`ImageBuilder`], padded, and recorded as `<out>/<stem>_<index>/meta.json`.
//! Jobs run one after another; a failed job is logged and skipped.

pub mod builder;
pub mod content;
pub mod job;
pub mod recipe;

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

pub use builder::{DockerBuilder, ImageBuilder};
pub use job::{Challenge, ChallengeMeta, Generator};

use crate::template::Template;

/// A job that did not produce a recorded challenge.
#[derive(Debug)]
pub struct FailedJob {
    pub index: usize,
    pub template: String,
    pub error: anyhow::Error,
}

/// Outcome of a generation run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub attempted: usize,
    pub challenges: Vec<Challenge>,
    pub failures: Vec<FailedJob>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.challenges.len()
    }

    pub fn print(&self) {
        println!();
        println!("Summary: {}/{} challenges built", self.succeeded(), self.attempted);
        for challenge in &self.challenges {
            let digest = sha256_file(&challenge.binary()).unwrap_or_else(|_| "-".to_string());
            match serde_json::to_string(&challenge.meta) {
                Ok(json) => println!("  {} {}", json, digest),
                Err(_) => println!("  {:?} {}", challenge.meta, digest),
            }
        }
        for failure in &self.failures {
            println!("  FAILED {} (job {})", failure.template, failure.index);
        }
    }
}

impl<B: ImageBuilder> Generator<B> {
    /// Attempt exactly `count` jobs, each against a uniformly random template.
    pub fn run<R: RngCore + ?Sized>(
        &self,
        templates: &[Template],
        count: usize,
        rng: &mut R,
    ) -> Result<RunSummary> {
        fs::create_dir_all(self.out_dir())
            .with_context(|| format!("Failed to create {}", self.out_dir().display()))?;

        let mut summary = RunSummary::default();
        for index in 0..count {
            let template = templates
                .choose(rng)
                .context("No templates to build")?;
            summary.attempted += 1;

            match self.build_one(template, index, rng) {
                Ok(challenge) => summary.challenges.push(challenge),
                Err(error) => {
                    tracing::error!(
                        template = %template.name(),
                        index,
                        error = %format!("{:#}", error),
                        "Challenge build failed"
                    );
                    summary.failures.push(FailedJob {
                        index,
                        template: template.name(),
                        error,
                    });
                }
            }
        }

        Ok(summary)
    }
}

/// Hex SHA-256 of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
