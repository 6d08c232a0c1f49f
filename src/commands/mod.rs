//! CLI command handlers.
//!
//! - `generate` - Build randomized challenge binaries
//! - `compose` - Package binaries for docker-compose
//! - `show` - Display configuration and templates
//! - `preflight` - Run preflight checks

pub mod compose;
pub mod generate;
mod preflight;
pub mod show;

pub use compose::cmd_compose;
pub use generate::cmd_generate;
pub use preflight::cmd_preflight;
pub use show::cmd_show;
