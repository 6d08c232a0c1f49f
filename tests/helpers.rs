//! Shared test utilities for ctfgen tests.

#![allow(dead_code)]

use anyhow::{bail, Result};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

use ctfgen::generate::ImageBuilder;

/// Workspace laid out the way `ctfgen generate` expects it.
pub struct TestEnv {
    /// Kept alive for the lifetime of the env
    pub _temp_dir: TempDir,
    pub base_dir: PathBuf,
    pub templates: PathBuf,
    pub out: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base_dir = temp_dir.path().to_path_buf();
        let templates = base_dir.join("templates");
        let out = base_dir.join("out");
        fs::create_dir_all(&templates).expect("Failed to create templates dir");

        Self {
            _temp_dir: temp_dir,
            base_dir,
            templates,
            out,
        }
    }

    /// Write `templates/<name>` and return its path.
    pub fn add_template(&self, name: &str, body: &str) -> PathBuf {
        let path = self.templates.join(name);
        fs::write(&path, body).expect("Failed to write template");
        path
    }

    /// Write the `<stem>.json` sidecar.
    pub fn add_metadata(&self, stem: &str, json: &str) {
        fs::write(self.templates.join(format!("{}.json", stem)), json)
            .expect("Failed to write template metadata");
    }

    /// Write a file relative to the base dir.
    pub fn write(&self, rel: &str, content: &[u8]) -> PathBuf {
        let path = self.base_dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }
}

/// One recorded call to [`FakeBuilder::build`].
#[derive(Debug, Clone)]
pub struct BuildCall {
    pub context: PathBuf,
    pub build_args: Vec<(String, String)>,
    pub output: PathBuf,
    /// `program.c` as it was in the context at build time
    pub source: String,
    /// Whether a `Dockerfile` was present at build time
    pub had_dockerfile: bool,
}

/// Records invocations and writes a fixed `challenge` binary instead of
/// running a real container build.
pub struct FakeBuilder {
    pub binary: Vec<u8>,
    /// Zero-based call numbers that fail
    pub fail_on: Vec<usize>,
    /// Skip writing the binary (the build "succeeds" but exports nothing)
    pub export_nothing: bool,
    pub calls: RefCell<Vec<BuildCall>>,
}

impl FakeBuilder {
    pub fn new() -> Self {
        Self {
            binary: b"\x7fELF fake challenge".to_vec(),
            fail_on: Vec::new(),
            export_nothing: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            fail_on: calls.to_vec(),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<BuildCall> {
        self.calls.borrow().clone()
    }
}

impl ImageBuilder for FakeBuilder {
    fn build(&self, context: &Path, build_args: &[(String, String)], output: &Path) -> Result<()> {
        let call_no = self.calls.borrow().len();
        self.calls.borrow_mut().push(BuildCall {
            context: context.to_path_buf(),
            build_args: build_args.to_vec(),
            output: output.to_path_buf(),
            source: fs::read_to_string(context.join("program.c")).unwrap_or_default(),
            had_dockerfile: context.join("Dockerfile").is_file(),
        });

        if self.fail_on.contains(&call_no) {
            bail!("fake build failed (call {})", call_no);
        }
        if !self.export_nothing {
            fs::write(output.join("challenge"), &self.binary)?;
        }
        Ok(())
    }
}

/// In-memory log sink for a `tracing_subscriber::fmt` subscriber.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Assert that a file contains expected content.
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to read file: {}", path.display()));
    assert!(
        content.contains(expected),
        "File {} does not contain expected content.\nExpected to find: {}\nActual content: {}",
        path.display(),
        expected,
        content
    );
}

/// Sorted file names directly inside `dir`.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap_or_else(|_| panic!("Failed to read dir: {}", dir.display()))
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
