use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;

use crate::core::{BackendKind, Config};
use crate::platform::{self, Platform};

/// List every backend in priority order and whether it runs on this host
pub fn execute(_matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let platform = Platform::current();
    let enabled = platform::gpu::enabled_kinds(&config, platform);

    println!(
        "{}",
        format!("GPU backends on {} (highest priority first)", platform)
            .cyan()
            .bold()
    );
    println!();

    for (index, kind) in BackendKind::PRIORITY.iter().enumerate() {
        let status = if !kind.supports(platform) {
            "unsupported".bright_black()
        } else if !config.is_enabled(*kind) {
            "disabled".yellow()
        } else {
            "enabled".green()
        };

        let live = if kind.can_poll_live() {
            "live"
        } else {
            "inventory only"
        };

        println!(
            "  {}. {:<16} {:<12} {}",
            index + 1,
            kind.name().white().bold(),
            status,
            live.dimmed()
        );
    }

    println!();
    println!("{} backend(s) will be probed", enabled.len());

    Ok(())
}
