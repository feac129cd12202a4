use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::core::{BackendKind, Config};

pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("path", _)) => show_path(),
        Some(("show", _)) => show_config(),
        Some(("disable", sub)) => toggle_backend(sub, false),
        Some(("enable", sub)) => toggle_backend(sub, true),
        _ => {
            println!("Use 'gpuscope config --help' for more information");
            Ok(())
        }
    }
}

fn show_path() -> Result<()> {
    let config_path = Config::get_config_path()?;
    println!("{}", config_path.display());
    Ok(())
}

fn show_config() -> Result<()> {
    let config = Config::load()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn toggle_backend(matches: &ArgMatches, enable: bool) -> Result<()> {
    let name = matches
        .get_one::<String>("backend")
        .context("Backend name is required")?;
    let kind: BackendKind = name.parse()?;

    let mut config = Config::load()?;
    let changed = if enable {
        config.enable_backend(kind)
    } else {
        config.disable_backend(kind)
    };

    if !changed {
        let state = if enable { "enabled" } else { "disabled" };
        println!("{}", format!("Backend {} is already {}", kind, state).yellow());
        return Ok(());
    }

    config.save()?;

    let verb = if enable { "Enabled" } else { "Disabled" };
    println!("{} {}", format!("{} backend", verb).green().bold(), kind);
    Ok(())
}
