//! ctfgen - CTF challenge generator.
//!
//! Builds randomized "capture the flag" binaries from C templates via a
//! containerized toolchain, and packages prebuilt binaries into a
//! docker-compose build context.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ctfgen::commands;
use ctfgen::compose::{
    PackageOptions, DEFAULT_COMPOSE_FILE, DEFAULT_IMAGE, DEFAULT_OUT_DIR, DEFAULT_SERVICE,
};
use ctfgen::config::Config;

#[derive(Parser)]
#[command(name = "ctfgen")]
#[command(about = "CTF challenge generator")]
#[command(
    after_help = concat!(
        "QUICK START:\n",
        "  ctfgen preflight  Check docker and templates\n",
        "  ctfgen generate   Build challenges into ./out\n",
        "  ctfgen compose binaries.json  Package binaries for docker-compose",
    )
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build randomized challenge binaries from templates
    Generate {
        /// Number of challenges to build (default: 4)
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Template directory (default: ./templates)
        #[arg(long)]
        templates: Option<PathBuf>,
        /// Output base directory (default: ./out)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Keep the build context of failed jobs for debugging
        #[arg(long)]
        keep_failed_context: bool,
        /// Seed for reproducible flags, keys and padding
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate a docker build context + docker-compose.yml from a JSON list of binaries
    Compose {
        /// Path to JSON file (array of paths or object name->path)
        json: PathBuf,
        /// Workspace root to resolve relative paths
        #[arg(long, default_value = ".")]
        workspace: PathBuf,
        /// Output build context directory
        #[arg(long, default_value = DEFAULT_OUT_DIR)]
        out: PathBuf,
        /// Service name to use in docker-compose
        #[arg(long, default_value = DEFAULT_SERVICE)]
        service: String,
        /// Image name to build
        #[arg(long, default_value = DEFAULT_IMAGE)]
        image: String,
        /// Compose file to write
        #[arg(long, default_value = DEFAULT_COMPOSE_FILE)]
        compose_file: PathBuf,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },

    /// Run preflight checks (verify the build tool and templates)
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
    /// List templates with their build settings
    Templates,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let base_dir = std::env::current_dir().context("Failed to determine current directory")?;

    // Load .env if present
    dotenvy::dotenv().ok();
    let load_config = || Config::load(&base_dir);

    match cli.command {
        Commands::Generate {
            count,
            templates,
            out,
            keep_failed_context,
            seed,
        } => {
            let options = commands::generate::GenerateOptions {
                count,
                templates,
                out,
                keep_failed_context,
                seed,
            };
            commands::cmd_generate(&base_dir, &load_config()?, options)?;
        }

        Commands::Compose {
            json,
            workspace,
            out,
            service,
            image,
            compose_file,
        } => {
            let workspace = ctfgen::config::resolve(&base_dir, workspace);
            let options = PackageOptions {
                base_dir: base_dir.clone(),
                workspace,
                out_dir: out,
                compose_file,
                service,
                image,
            };
            commands::cmd_compose(&json, &options)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
                ShowTarget::Templates => commands::show::ShowTarget::Templates,
            };
            commands::cmd_show(show_target, &load_config()?)?;
        }

        Commands::Preflight { strict } => {
            commands::cmd_preflight(&load_config()?, strict)?;
        }
    }

    Ok(())
}
