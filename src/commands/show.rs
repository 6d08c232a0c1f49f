//! Show command - displays information.

use anyhow::Result;

use crate::config::Config;
use crate::template::TemplateStore;

/// Show target for the show command.
pub enum ShowTarget {
    /// Resolved configuration
    Config,
    /// Discovered templates and their build settings
    Templates,
}

/// Execute the show command.
pub fn cmd_show(target: ShowTarget, config: &Config) -> Result<()> {
    match target {
        ShowTarget::Config => config.print(),
        ShowTarget::Templates => {
            let store = TemplateStore::new(&config.templates_dir);
            println!("Templates in {}:", store.dir().display());
            for template in store.list()? {
                let meta = template.metadata();
                println!("  {}", template.name());
                println!("    difficulty: {}", meta.difficulty);
                println!("    pad_max:    {}", meta.pad_max);
                println!("    cflags:     {}", meta.cflags.join(" | "));
            }
        }
    }
    Ok(())
}
