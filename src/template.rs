//! Template discovery and sidecar metadata.
//!
//! A template is a `.c` or `.txt` file in the templates directory. An
//! optional `<stem>.json` next to it tunes how the challenge is built:
//!
//! ```json
//! { "cflags": ["-O0 -g", "-O2"], "pad_max": 512, "difficulty": "easy" }
//! ```
//!
//! A sidecar that fails to parse is reported and ignored; a single field of
//! the wrong type is reported and replaced by its default.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions recognized as templates.
pub const TEMPLATE_EXTENSIONS: &[&str] = &["c", "txt"];

/// Compiler flag combinations used when a template doesn't list its own.
pub const DEFAULT_CFLAGS: &[&str] = &["-O0 -g", "-O2", "-Os", "-O3", "-O1 -s"];

/// Padding ceiling in bytes when a template doesn't set one.
pub const DEFAULT_PAD_MAX: u64 = 1024;

pub const DEFAULT_DIFFICULTY: &str = "unknown";

/// Raw sidecar contents. Fields are kept as JSON so one bad field only
/// costs that field.
#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    cflags: Option<Value>,
    pad_max: Option<Value>,
    pad: Option<Value>,
    difficulty: Option<Value>,
}

/// Build settings for one template, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMetadata {
    pub cflags: Vec<String>,
    pub pad_max: u64,
    pub difficulty: String,
}

impl Default for TemplateMetadata {
    fn default() -> Self {
        Self {
            cflags: DEFAULT_CFLAGS.iter().map(|s| s.to_string()).collect(),
            pad_max: DEFAULT_PAD_MAX,
            difficulty: DEFAULT_DIFFICULTY.to_string(),
        }
    }
}

fn invalid_field(field: &str, value: &Value) {
    tracing::warn!(field, value = %value, "Invalid template metadata field, using default");
}

fn cflags_field(value: &Value) -> Option<Vec<String>> {
    let list: Vec<String> = value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect::<Option<_>>()?;
    Some(list)
}

/// Negative ceilings clamp to 0, which disables padding.
fn pad_field(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_i64().map(|n| n.max(0) as u64))
}

impl From<RawMetadata> for TemplateMetadata {
    fn from(raw: RawMetadata) -> Self {
        let mut meta = Self::default();

        if let Some(value) = raw.cflags {
            match cflags_field(&value) {
                Some(list) if !list.is_empty() => meta.cflags = list,
                Some(_) => {}
                None => invalid_field("cflags", &value),
            }
        }

        let (field, pad) = match (raw.pad_max, raw.pad) {
            (Some(value), _) => ("pad_max", Some(value)),
            (None, value) => ("pad", value),
        };
        if let Some(value) = pad {
            match pad_field(&value) {
                Some(n) => meta.pad_max = n,
                None => invalid_field(field, &value),
            }
        }

        if let Some(value) = raw.difficulty {
            match value.as_str() {
                Some(d) => meta.difficulty = d.to_string(),
                None => invalid_field("difficulty", &value),
            }
        }

        meta
    }
}

impl TemplateMetadata {
    /// Parse sidecar JSON. Only a document that isn't a JSON object fails;
    /// a field of the wrong type falls back to its default on its own.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawMetadata = serde_json::from_str(content)?;
        Ok(raw.into())
    }
}

/// A template source file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub path: PathBuf,
}

impl Template {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File stem, used to name output directories.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name including extension, as recorded in `meta.json`.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.with_extension("json")
    }

    pub fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read template {}", self.path.display()))
    }

    /// Load the sidecar metadata, falling back to defaults if it is missing
    /// or broken.
    pub fn metadata(&self) -> TemplateMetadata {
        let meta_path = self.metadata_path();
        if !meta_path.is_file() {
            return TemplateMetadata::default();
        }

        let parsed = fs::read_to_string(&meta_path)
            .map_err(anyhow::Error::from)
            .and_then(|content| TemplateMetadata::parse(&content));

        match parsed {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!(
                    path = %meta_path.display(),
                    error = %e,
                    "Failed to read template metadata, using defaults"
                );
                TemplateMetadata::default()
            }
        }
    }
}

/// The set of templates available in one directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Templates in the directory, sorted by file name.
    ///
    /// Fails if the directory is missing or holds no templates.
    pub fn list(&self) -> Result<Vec<Template>> {
        if !self.dir.is_dir() {
            bail!("Templates directory not found: {}", self.dir.display());
        }

        let mut templates = Vec::new();
        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry
                .with_context(|| format!("Failed to scan {}", self.dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let recognized = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext));
            if recognized {
                templates.push(Template::new(entry.path()));
            }
        }

        if templates.is_empty() {
            bail!("No templates found in {}", self.dir.display());
        }

        Ok(templates)
    }
}
