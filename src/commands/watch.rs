//! Live telemetry loop.

use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::ui::snapshot_line;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let json_output = matches.get_flag("json");
    let count = matches.get_one::<u64>("count").copied();

    let (config, detector) = super::detect_gpu()?;
    let interval_ms = matches
        .get_one::<u64>("interval")
        .copied()
        .unwrap_or(config.poll_interval_ms)
        .max(100);

    let identity = detector.identity();
    let telemetry = detector.telemetry();

    if !json_output {
        println!("{} {}", "GPU:".white().bold(), identity.name.cyan());
        if !telemetry.is_live() {
            println!(
                "{}",
                "Live monitoring unavailable. All metrics will read N/A.".yellow()
            );
        }
        println!("{}", "Press Ctrl+C to stop".dimmed());
        println!();
    }

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();

    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::Relaxed);
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let mut samples = 0u64;
    while !stop_flag.load(Ordering::Relaxed) {
        let snapshot = telemetry.snapshot();

        if json_output {
            println!("{}", serde_json::to_string(&snapshot)?);
        } else {
            println!("{}", snapshot_line(&snapshot));
        }

        samples += 1;
        if count.is_some_and(|n| samples >= n) {
            break;
        }

        sleep_unless_stopped(Duration::from_millis(interval_ms), &stop_flag);
    }

    log::debug!("Stopped after {} sample(s)", samples);

    // Dropping the detector and the last telemetry handle releases the backend.
    drop(telemetry);
    drop(detector);

    Ok(())
}

/// Sleep in short slices so Ctrl+C is honoured quickly
fn sleep_unless_stopped(total: Duration, stop_flag: &AtomicBool) {
    const SLICE: Duration = Duration::from_millis(50);

    let mut remaining = total;
    while !remaining.is_zero() && !stop_flag.load(Ordering::Relaxed) {
        let step = remaining.min(SLICE);
        std::thread::sleep(step);
        remaining -= step;
    }
}
