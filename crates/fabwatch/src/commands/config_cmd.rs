//! Configuration command handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let config = load_with_overrides(global)?;
            println!("{}", config.to_toml().map_err(CliError::from)?);
            Ok(())
        }

        ConfigCommand::Init => {
            let config = load_with_overrides(global)?;
            let path = fabwatch_config::save(&config)?;
            if !global.quiet {
                eprintln!("Wrote {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", fabwatch_config::config_path().display());
            Ok(())
        }
    }
}

/// File + env config with CLI flags layered on top.
fn load_with_overrides(global: &GlobalOpts) -> Result<fabwatch_config::Config, CliError> {
    let mut config = fabwatch_config::load()?;
    if let Some(ref gateway) = global.gateway {
        config.gateway = Some(gateway.clone());
    }
    if global.insecure {
        config.insecure = true;
    }
    config.timeout = global.timeout;
    Ok(config)
}
