//! Config commands

use anyhow::anyhow;

use super::Context;
use crate::config::Config;
use crate::ConfigCommands;

pub fn handle(action: ConfigCommands, profile: Option<&str>, ctx: &Context) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Init => {
            let path = Config::config_path(profile).map_err(|e| anyhow!(e))?;
            if path.exists() {
                return Err(anyhow!("{} already exists", path.display()));
            }
            let path = Config::initial().save(profile).map_err(|e| anyhow!(e))?;
            println!("Configuration initialized at {}", path.display());
        }
        ConfigCommands::Show => {
            if ctx.format.is_table() {
                println!("store: {}", ctx.store_dir.display());
                println!("{}", toml::to_string_pretty(&ctx.config)?);
            } else {
                ctx.format.print(&ctx.config);
            }
        }
    }
    Ok(())
}
