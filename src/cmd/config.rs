//! Configuration view and validation commands — `taskboard config`.

use anyhow::Result;

use taskboard::config::{TaskboardConfig, TaskboardToml};
use taskboard::ui::icons::{CHECK, WARN};

use crate::{Cli, ConfigCommands};

pub fn cmd_config(cli: &Cli, command: Option<ConfigCommands>) -> Result<()> {
    let config = TaskboardConfig::load(cli.config.clone(), cli.base_url.clone())?;
    let config_path = &config.config_path;

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Taskboard Configuration");
            println!("=======================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No taskboard.toml found at {}", config_path.display());
                println!("Run 'taskboard config init' to create one.");
            }
            println!();

            let toml = &config.toml;
            println!("[server]");
            println!("  base_url = \"{}\"", toml.server.base_url);
            println!("  timeout_secs = {}", toml.server.timeout_secs);
            println!();
            println!("[notifications]");
            println!("  poll_interval_secs = {}", toml.notifications.poll_interval_secs);
            println!();
            if let Some(path) = &toml.session.path {
                println!("[session]");
                println!("  path = \"{}\"", path.display());
                println!();
            }

            println!("Effective values (with env/CLI overrides):");
            println!("  base_url = \"{}\"", config.base_url);
            println!("  timeout = {}s", config.timeout.as_secs());
            println!("  poll_interval = {}s", config.poll_interval.as_secs());
            println!("  session = \"{}\"", config.session_path.display());
            println!();
        }
        Some(ConfigCommands::Validate) => {
            let warnings = config.validate();
            if warnings.is_empty() {
                println!("{}Configuration is valid.", CHECK);
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  {}{}", WARN, warning);
                }
            }
        }
        Some(ConfigCommands::Init { force }) => {
            if config_path.exists() && !force {
                println!("taskboard.toml already exists at {}", config_path.display());
                println!("Pass --force to overwrite it.");
                return Ok(());
            }

            TaskboardToml::default().save(config_path)?;
            println!("{}Created {}", CHECK, config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [server] base_url, timeout_secs");
            println!("  - [notifications] poll_interval_secs");
            println!("  - [session] path");
        }
    }

    Ok(())
}
