//! A single challenge build: render, compile, pad, record.

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::builder::ImageBuilder;
use super::content;
use super::recipe::{self, BINARY_NAME, CFLAGS_ARG, DOCKERFILE_NAME, SOURCE_NAME};
use crate::common::{cleanup_work_dir, create_work_dir, write_file_with_dirs};
use crate::template::{Template, TemplateMetadata};
use crate::timing::Timer;

/// Name of the metadata record written next to every binary.
pub const META_NAME: &str = "meta.json";

/// Padding is generated and appended this many bytes at a time.
const PAD_CHUNK: usize = 64 * 1024;

/// The durable record of what was embedded in one challenge binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeMeta {
    pub template: String,
    pub flag: String,
    pub cflags: String,
    pub pad: u64,
    pub difficulty: String,
}

/// A successfully recorded job.
#[derive(Debug, Clone)]
pub struct Challenge {
    pub index: usize,
    pub dir: PathBuf,
    pub meta: ChallengeMeta,
}

impl Challenge {
    pub fn binary(&self) -> PathBuf {
        self.dir.join(BINARY_NAME)
    }

    pub fn meta_path(&self) -> PathBuf {
        self.dir.join(META_NAME)
    }
}

/// Output directory name for a job.
pub fn job_dir_name(template: &Template, index: usize) -> String {
    format!("{}_{}", template.stem(), index)
}

/// Append `0..=pad_max` random bytes to `binary`, returning the count.
pub fn pad_binary<R: Rng + ?Sized>(binary: &Path, pad_max: u64, rng: &mut R) -> Result<u64> {
    let pad = rng.gen_range(0..=pad_max);
    if pad == 0 {
        return Ok(0);
    }

    let mut file = OpenOptions::new()
        .append(true)
        .open(binary)
        .with_context(|| format!("Failed to open {} for padding", binary.display()))?;

    let mut chunk = [0u8; PAD_CHUNK];
    let mut remaining = pad;
    while remaining > 0 {
        let len = remaining.min(PAD_CHUNK as u64) as usize;
        rng.fill_bytes(&mut chunk[..len]);
        file.write_all(&chunk[..len])
            .with_context(|| format!("Failed to pad {}", binary.display()))?;
        remaining -= len as u64;
    }
    Ok(pad)
}

/// Runs challenge jobs against an [`ImageBuilder`].
pub struct Generator<B> {
    builder: B,
    out_dir: PathBuf,
    keep_failed_context: bool,
}

impl<B: ImageBuilder> Generator<B> {
    pub fn new(builder: B, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            builder,
            out_dir: out_dir.into(),
            keep_failed_context: false,
        }
    }

    /// Leave the build context on disk when a build fails.
    pub fn keep_failed_context(mut self, keep: bool) -> Self {
        self.keep_failed_context = keep;
        self
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Build one challenge from `template` into `<out>/<stem>_<index>/`.
    ///
    /// The temporary build context is always removed (unless
    /// `keep_failed_context` is set and the job failed). On failure the
    /// job's output directory is removed too, so no stale `meta.json`
    /// survives.
    pub fn build_one<R: RngCore + ?Sized>(
        &self,
        template: &Template,
        index: usize,
        rng: &mut R,
    ) -> Result<Challenge> {
        let meta = template.metadata();
        let job_dir = self.out_dir.join(job_dir_name(template, index));
        fs::create_dir_all(&job_dir)
            .with_context(|| format!("Failed to create {}", job_dir.display()))?;

        let context = create_work_dir(&format!("ctx_{}_", job_dir_name(template, index)))?;
        let result = self.build_in_context(template, index, &meta, &job_dir, &context, rng);

        match &result {
            Err(_) if self.keep_failed_context => {
                tracing::warn!(path = %context.display(), "Keeping failed build context");
            }
            _ => cleanup_work_dir(&context),
        }
        if result.is_err() {
            cleanup_work_dir(&job_dir);
        }

        result
    }

    fn build_in_context<R: RngCore + ?Sized>(
        &self,
        template: &Template,
        index: usize,
        meta: &TemplateMetadata,
        job_dir: &Path,
        context: &Path,
        rng: &mut R,
    ) -> Result<Challenge> {
        let text = template.read()?;
        let rendered = content::render(&text, rng);

        write_file_with_dirs(context.join(SOURCE_NAME), &rendered.source)?;
        write_file_with_dirs(context.join(DOCKERFILE_NAME), recipe::dockerfile())?;

        let cflags = meta
            .cflags
            .choose(rng)
            .cloned()
            .context("Template has no compiler flag choices")?;

        tracing::info!(
            job = %job_dir_name(template, index),
            template = %template.name(),
            cflags = %cflags,
            difficulty = %meta.difficulty,
            "Building challenge"
        );

        let timer = Timer::start(job_dir_name(template, index));
        self.builder.build(
            context,
            &[(CFLAGS_ARG.to_string(), cflags.clone())],
            job_dir,
        )?;
        timer.finish();

        let binary = job_dir.join(BINARY_NAME);
        let pad = if !binary.is_file() {
            tracing::warn!(path = %binary.display(), "Build produced no binary, skipping padding");
            0
        } else if meta.pad_max > 0 {
            pad_binary(&binary, meta.pad_max, rng)?
        } else {
            0
        };

        let record = ChallengeMeta {
            template: template.name(),
            flag: rendered.flag,
            cflags,
            pad,
            difficulty: meta.difficulty.clone(),
        };
        let json = serde_json::to_string_pretty(&record)?;
        write_file_with_dirs(job_dir.join(META_NAME), json)?;

        tracing::info!(
            path = %binary.display(),
            flag = %record.flag,
            pad,
            "Built challenge"
        );

        Ok(Challenge {
            index,
            dir: job_dir.to_path_buf(),
            meta: record,
        })
    }
}
