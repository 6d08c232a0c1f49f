//! The container build seam.

use anyhow::Result;
use std::path::Path;

use crate::process::Cmd;

/// Builds an image from a prepared context and exports the final stage's
/// filesystem into `output`.
pub trait ImageBuilder {
    fn build(&self, context: &Path, build_args: &[(String, String)], output: &Path) -> Result<()>;
}

/// `docker build --output` (or any CLI-compatible tool such as podman/buildah).
#[derive(Debug, Clone)]
pub struct DockerBuilder {
    program: String,
}

impl DockerBuilder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The invocation [`ImageBuilder::build`] runs.
    pub fn command(&self, context: &Path, build_args: &[(String, String)], output: &Path) -> Cmd {
        let mut cmd = Cmd::new(&self.program).arg("build");
        for (key, value) in build_args {
            cmd = cmd.arg("--build-arg").arg(format!("{}={}", key, value));
        }
        cmd.arg("--output")
            .arg_path(output)
            .arg_path(context)
            .error_msg(format!("{} build failed", self.program))
    }
}

impl Default for DockerBuilder {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_BUILDER)
    }
}

impl ImageBuilder for DockerBuilder {
    fn build(&self, context: &Path, build_args: &[(String, String)], output: &Path) -> Result<()> {
        let cmd = self.command(context, build_args, output);
        tracing::debug!(command = %cmd.display(), "Invoking container build");
        let result = cmd.run()?;
        // BuildKit reports progress on stderr.
        tracing::debug!(
            stdout = %result.stdout.trim(),
            stderr = %result.stderr.trim(),
            "Container build finished"
        );
        Ok(())
    }
}
