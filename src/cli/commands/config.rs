//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{ClashError, ClashResult};
use console::style;
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> ClashResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut config = config.clone();
            set_value(&mut config, &key, &value).map_err(|reason| ClashError::ConfigInvalid {
                path: manager.path().to_path_buf(),
                reason,
            })?;
            manager.save(&config).await?;
            println!("{} {} = {}", style("Set").green(), key, value);
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> ClashResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> ClashResult<()> {
    let path = manager.path();

    if path.exists() && !force {
        println!(
            "{} Config already exists at {}",
            style("!").yellow(),
            path.display()
        );
        println!("  Use --force to overwrite");
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    println!(
        "{} Configuration initialized at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

/// Apply one dot-separated `key = value` assignment.
fn set_value(config: &mut Config, key: &str, value: &str) -> Result<(), String> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => return Err(format!("log_format must be text or json, got {}", value)),
        },
        ["cache", "dir"] => config.cache.dir = optional_path(value),
        ["cache", "omit_locks"] => config.cache.omit_locks = parse_bool(value)?,
        ["compiler", "path"] => config.compiler.path = optional_path(value),
        ["compiler", "cygwin_fix"] => config.compiler.cygwin_fix = parse_bool(value)?,
        _ => return Err(format!("unknown config key: {}", key)),
    }
    Ok(())
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(format!("expected a boolean, got {}", value)),
    }
}
