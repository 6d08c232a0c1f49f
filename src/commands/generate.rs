//! Generate command - builds randomized challenge binaries.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

use crate::config::{resolve, Config};
use crate::generate::{DockerBuilder, Generator, RunSummary};
use crate::template::TemplateStore;

/// CLI overrides on top of the loaded [`Config`].
#[derive(Debug, Default)]
pub struct GenerateOptions {
    pub count: Option<usize>,
    pub templates: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub keep_failed_context: bool,
    pub seed: Option<u64>,
}

impl GenerateOptions {
    pub fn apply(&self, base_dir: &Path, config: &Config) -> Config {
        let mut config = config.clone();
        if let Some(count) = self.count {
            config.count = count;
        }
        if let Some(ref dir) = self.templates {
            config.templates_dir = resolve(base_dir, dir);
        }
        if let Some(ref dir) = self.out {
            config.out_dir = resolve(base_dir, dir);
        }
        config.keep_failed_context |= self.keep_failed_context;
        config
    }
}

/// Execute the generate command.
pub fn cmd_generate(
    base_dir: &Path,
    config: &Config,
    options: GenerateOptions,
) -> Result<RunSummary> {
    let config = options.apply(base_dir, config);
    let templates = TemplateStore::new(&config.templates_dir).list()?;

    tracing::info!(
        templates = templates.len(),
        count = config.count,
        out = %config.out_dir.display(),
        "Starting challenge generation"
    );

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let generator = Generator::new(DockerBuilder::new(&config.builder), &config.out_dir)
        .keep_failed_context(config.keep_failed_context);
    let summary = generator.run(&templates, config.count, &mut rng)?;
    summary.print();

    Ok(summary)
}
