//! Compose command - packages binaries into a docker build context.

use anyhow::Result;
use std::path::Path;

use crate::compose::{self, PackageOptions};

/// Execute the compose command.
pub fn cmd_compose(manifest: &Path, options: &PackageOptions) -> Result<()> {
    let packaged = compose::package(manifest, options)?;

    let show = |p: &Path| {
        p.canonicalize()
            .unwrap_or_else(|_| p.to_path_buf())
            .display()
            .to_string()
    };
    println!("Wrote build context to: {}", show(&packaged.context_dir));
    println!("Wrote compose file: {}", show(&packaged.compose_file));
    println!("To build: docker-compose build");
    println!("To run: docker-compose up --build");
    Ok(())
}
