use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;

use crate::core::DetectorState;
use crate::ui::identity_rows;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let json_output = matches.get_flag("json");
    let (_config, detector) = super::detect_gpu()?;
    let identity = detector.identity();

    if json_output {
        println!("{}", serde_json::to_string_pretty(identity.as_ref())?);
        return Ok(());
    }

    match detector.state() {
        DetectorState::Committed(kind) => {
            println!("{}", format!("GPU detected via {}", kind).green().bold())
        }
        _ => println!("{}", "No GPU detected".yellow().bold()),
    }
    println!();

    for (label, value) in identity_rows(&identity) {
        println!("  {:<16} {}", format!("{}:", label).white().bold(), value);
    }

    if identity.is_detected() && !identity.can_poll_live {
        println!();
        println!(
            "{}",
            "Live monitoring unavailable for this GPU. Showing static information only.".yellow()
        );
    }

    Ok(())
}
