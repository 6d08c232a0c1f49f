//! Configuration for the challenge generator.
//!
//! Values come from (lowest to highest precedence) built-in defaults, a
//! `.env` file, the process environment and finally CLI flags, which the
//! command layer applies on top of the loaded [`Config`].

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Number of challenges produced per run unless overridden.
pub const DEFAULT_COUNT: usize = 4;

/// Container build tool invoked for every job.
pub const DEFAULT_BUILDER: &str = "docker";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned for `.c`/`.txt` templates (default: templates)
    pub templates_dir: PathBuf,
    /// Base directory receiving `<stem>_<index>/` job outputs (default: out)
    pub out_dir: PathBuf,
    /// Number of jobs per run
    pub count: usize,
    /// Container build executable
    pub builder: String,
    /// Keep the temporary build context of a job whose build failed
    pub keep_failed_context: bool,
}

impl Config {
    /// Defaults relative to `base_dir`.
    pub fn new(base_dir: &Path) -> Self {
        Self {
            templates_dir: base_dir.join("templates"),
            out_dir: base_dir.join("out"),
            count: DEFAULT_COUNT,
            builder: DEFAULT_BUILDER.to_string(),
            keep_failed_context: false,
        }
    }

    /// Load from the process environment (`.env` must already be applied).
    pub fn load(base_dir: &Path) -> Result<Self> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(base_dir, &vars)
    }

    /// Build a config from an explicit variable map.
    pub fn from_vars(base_dir: &Path, vars: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::new(base_dir);

        if let Some(dir) = vars.get("CTFGEN_TEMPLATES_DIR") {
            config.templates_dir = resolve(base_dir, dir);
        }
        if let Some(dir) = vars.get("CTFGEN_OUT_DIR") {
            config.out_dir = resolve(base_dir, dir);
        }
        if let Some(count) = vars.get("CTFGEN_COUNT") {
            config.count = count.trim().parse().with_context(|| {
                format!("CTFGEN_COUNT must be a non-negative integer, got '{}'", count)
            })?;
        }
        if let Some(builder) = vars.get("CTFGEN_BUILDER") {
            if !builder.trim().is_empty() {
                config.builder = builder.trim().to_string();
            }
        }
        if let Some(keep) = vars.get("CTFGEN_KEEP_FAILED_CONTEXT") {
            config.keep_failed_context = matches!(
                keep.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }

        Ok(config)
    }

    pub fn has_templates_dir(&self) -> bool {
        self.templates_dir.is_dir()
    }

    pub fn print(&self) {
        println!("Configuration:");
        println!("  CTFGEN_TEMPLATES_DIR: {}", self.templates_dir.display());
        println!("  CTFGEN_OUT_DIR: {}", self.out_dir.display());
        println!("  CTFGEN_COUNT: {}", self.count);
        println!("  CTFGEN_BUILDER: {}", self.builder);
        println!("  CTFGEN_KEEP_FAILED_CONTEXT: {}", self.keep_failed_context);
        if self.has_templates_dir() {
            println!("  Templates directory: FOUND");
        } else {
            println!("  Templates directory: NOT FOUND");
        }
    }
}

/// Resolve `value` against `base_dir` unless it is already absolute.
pub fn resolve(base_dir: &Path, value: impl AsRef<Path>) -> PathBuf {
    let path = value.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(Path::new("/work"), &HashMap::new()).unwrap();
        assert_eq!(config.templates_dir, PathBuf::from("/work/templates"));
        assert_eq!(config.out_dir, PathBuf::from("/work/out"));
        assert_eq!(config.count, DEFAULT_COUNT);
        assert_eq!(config.builder, "docker");
        assert!(!config.keep_failed_context);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(
            Path::new("/work"),
            &vars(&[
                ("CTFGEN_TEMPLATES_DIR", "tpl"),
                ("CTFGEN_OUT_DIR", "/abs/out"),
                ("CTFGEN_COUNT", " 9 "),
                ("CTFGEN_BUILDER", "podman"),
                ("CTFGEN_KEEP_FAILED_CONTEXT", "TRUE"),
            ]),
        )
        .unwrap();
        assert_eq!(config.templates_dir, PathBuf::from("/work/tpl"));
        assert_eq!(config.out_dir, PathBuf::from("/abs/out"));
        assert_eq!(config.count, 9);
        assert_eq!(config.builder, "podman");
        assert!(config.keep_failed_context);
    }

    #[test]
    fn test_bad_count_is_fatal() {
        let err = Config::from_vars(Path::new("/work"), &vars(&[("CTFGEN_COUNT", "four")]))
            .unwrap_err();
        assert!(err.to_string().contains("CTFGEN_COUNT"));
    }

    #[test]
    #[serial]
    fn test_load_reads_process_env() {
        std::env::set_var("CTFGEN_COUNT", "2");
        let config = Config::load(Path::new("/work"));
        std::env::remove_var("CTFGEN_COUNT");
        assert_eq!(config.unwrap().count, 2);
    }
}
