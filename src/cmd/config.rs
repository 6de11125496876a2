//! Configuration commands — `formgate config`.

use std::path::Path;

use anyhow::{Context, Result};

use formgate::config::{Config, DEFAULT_CONFIG_FILE, default_config_toml};

use super::super::ConfigCommands;

pub fn cmd_config(project_dir: &Path, command: Option<ConfigCommands>) -> Result<()> {
    match command.unwrap_or(ConfigCommands::Show) {
        ConfigCommands::Show => {
            let config = Config::load(project_dir)?;
            print!("{}", config.to_toml()?);
        }
        ConfigCommands::Validate => {
            let config = Config::load(project_dir)?;
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration OK");
            } else {
                for warning in &warnings {
                    println!("warning: {warning}");
                }
                anyhow::bail!("{} warning(s) found", warnings.len());
            }
        }
        ConfigCommands::Init => {
            let path = project_dir.join(DEFAULT_CONFIG_FILE);
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            std::fs::write(&path, default_config_toml())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Initialized {}", path.display());
        }
    }
    Ok(())
}
