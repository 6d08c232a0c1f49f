//! Package prebuilt binaries into a docker build context and a
//! `docker-compose.yml` that builds an image containing them.

pub mod manifest;

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub use manifest::{load_manifest, parse_manifest, ManifestEntry};

use crate::common::{make_owner_executable, recreate_dir, write_file_with_dirs};
use crate::config::resolve;

pub const DEFAULT_OUT_DIR: &str = "docker_build";
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";
pub const DEFAULT_SERVICE: &str = "binaries";
pub const DEFAULT_IMAGE: &str = "ctf-binaries:latest";

/// Where binaries land inside the image.
pub const TARGET_DIR: &str = "/opt/binaries";

/// Recipe file name inside the build context; not usable as a binary name.
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Packaging settings. Relative `out_dir`/`compose_file` resolve against
/// `base_dir`; manifest sources resolve against `workspace`.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub base_dir: PathBuf,
    pub workspace: PathBuf,
    pub out_dir: PathBuf,
    pub compose_file: PathBuf,
    pub service: String,
    pub image: String,
}

impl PackageOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            workspace: base_dir.clone(),
            base_dir,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            compose_file: PathBuf::from(DEFAULT_COMPOSE_FILE),
            service: DEFAULT_SERVICE.to_string(),
            image: DEFAULT_IMAGE.to_string(),
        }
    }
}

/// What [`package`] wrote.
#[derive(Debug, Clone)]
pub struct Packaged {
    pub context_dir: PathBuf,
    pub compose_file: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Resolve each entry against `workspace` and require it to be a file.
///
/// Fails on the first missing source, before anything is written.
pub fn resolve_sources(
    entries: &[ManifestEntry],
    workspace: &Path,
) -> Result<Vec<(String, PathBuf)>> {
    entries
        .iter()
        .map(|entry| {
            let src = resolve(workspace, &entry.path);
            if !src.is_file() {
                bail!("Source file not found: {}", src.display());
            }
            Ok((entry.name.clone(), src))
        })
        .collect()
}

/// Lexically drop `.`/`..`, then canonicalize if the path exists.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out.canonicalize().unwrap_or(out)
}

/// The context directory is wiped before copying, so it must not hold the
/// invocation directory, the workspace, the manifest or any source.
pub fn check_context_dir(
    context_dir: &Path,
    base_dir: &Path,
    protected: &[&Path],
) -> Result<()> {
    let context = normalize(context_dir);
    if normalize(base_dir).starts_with(&context) {
        bail!(
            "Output directory {} contains the invocation directory; refusing to delete it",
            context_dir.display()
        );
    }
    for path in protected {
        if normalize(path).starts_with(&context) {
            bail!(
                "Output directory {} contains {}; refusing to delete it",
                context_dir.display(),
                path.display()
            );
        }
    }
    Ok(())
}

/// Recreate `out_dir` and copy every source into it, marked owner-executable.
pub fn prepare_build_context(
    sources: &[(String, PathBuf)],
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    recreate_dir(out_dir)?;

    let mut copied = Vec::with_capacity(sources.len());
    for (name, src) in sources {
        let dest = out_dir.join(name);
        fs::copy(src, &dest).with_context(|| {
            format!("Failed to copy {} to {}", src.display(), dest.display())
        })?;
        make_owner_executable(&dest)?;
        tracing::debug!(src = %src.display(), dest = %dest.display(), "Copied binary");
        copied.push(dest);
    }
    Ok(copied)
}

pub fn dockerfile(target_dir: &str) -> String {
    format!(
        r#"FROM ubuntu:22.04
WORKDIR {dir}
COPY . {dir}
RUN chmod +x {dir}/* || true
CMD ["/bin/bash"]
"#,
        dir = target_dir
    )
}

pub fn compose_yaml(service: &str, image: &str, build_dir: &str) -> String {
    format!(
        r#"version: '3.8'
services:
  {service}:
    build:
      context: {build_dir}
    image: {image}
    tty: true
"#
    )
}

/// Build the context directory and compose file for `manifest_path`.
pub fn package(manifest_path: &Path, options: &PackageOptions) -> Result<Packaged> {
    let manifest_path = resolve(&options.workspace, manifest_path);
    let entries = load_manifest(&manifest_path)?;
    let sources = resolve_sources(&entries, &options.workspace)?;

    let context_dir = resolve(&options.base_dir, &options.out_dir);
    let mut protected: Vec<&Path> = vec![&options.workspace, &manifest_path];
    protected.extend(sources.iter().map(|(_, src)| src.as_path()));
    check_context_dir(&context_dir, &options.base_dir, &protected)?;

    let files = prepare_build_context(&sources, &context_dir)?;
    write_file_with_dirs(context_dir.join(DOCKERFILE_NAME), dockerfile(TARGET_DIR))?;

    let compose_file = resolve(&options.base_dir, &options.compose_file);
    let yaml = compose_yaml(
        &options.service,
        &options.image,
        &options.out_dir.to_string_lossy(),
    );
    write_file_with_dirs(&compose_file, yaml)?;

    tracing::info!(
        binaries = files.len(),
        context = %context_dir.display(),
        "Prepared build context"
    );

    Ok(Packaged {
        context_dir,
        compose_file,
        files,
    })
}
