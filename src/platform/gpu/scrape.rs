//! Last-resort identity from `lspci` (Linux) or `system_profiler` (macOS).
//!
//! These are point-in-time inventory queries, so the backend never polls.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::gpu::{
    classify_vendor, BackendKind, DeviceIdentity, GpuBackend, MemoryUnit, RawReading,
};
use crate::error::{GpuError, Result};
use crate::platform::command::run_command;
use crate::platform::Platform;

static CHIPSET_MODEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Chipset Model:\s*(.+)").expect("valid regex"));
static VRAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"VRAM \([^)]*\):\s*(\d+)\s*(GB|MB)").expect("valid regex"));
static PCI_REVISION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(rev [0-9a-fA-F]+\)\s*$").expect("valid regex"));

/// Device name from the first VGA/3D controller line of `lspci`
pub fn parse_lspci(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| line.contains("VGA") || line.contains("3D"))
        .find_map(|line| {
            let name = line.rsplit(':').next()?.trim();
            let name = PCI_REVISION.replace(name, "");
            (!name.is_empty()).then(|| name.into_owned())
        })
}

/// Chipset model and VRAM (bytes, when listed) from `system_profiler SPDisplaysDataType`
pub fn parse_system_profiler(output: &str) -> Option<(String, Option<u64>)> {
    let name = CHIPSET_MODEL
        .captures(output)?
        .get(1)?
        .as_str()
        .trim()
        .to_string();

    let vram = VRAM.captures(output).and_then(|caps| {
        let amount: u64 = caps.get(1)?.as_str().parse().ok()?;
        let unit = match caps.get(2)?.as_str() {
            "GB" => MemoryUnit::Gibibytes,
            _ => MemoryUnit::Mebibytes,
        };
        Some(unit.to_bytes(amount))
    });

    Some((name, vram))
}

/// Identity-only backend scraping OS inventory commands
pub struct CommandScrapeBackend {
    platform: Platform,
}

impl CommandScrapeBackend {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    fn scrape(&self) -> Result<(String, Option<u64>)> {
        let found = match self.platform {
            Platform::Linux => {
                let output = run_command("lspci", &[])?;
                parse_lspci(&output).map(|name| (name, None))
            }
            Platform::MacOs => {
                let output = run_command("system_profiler", &["SPDisplaysDataType"])?;
                parse_system_profiler(&output)
            }
            _ => {
                return Err(GpuError::unavailable(
                    BackendKind::CommandScrape,
                    format!("no inventory command on {}", self.platform),
                ))
            }
        };

        found.ok_or_else(|| {
            GpuError::unavailable(BackendKind::CommandScrape, "no display controller listed")
        })
    }
}

impl GpuBackend for CommandScrapeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::CommandScrape
    }

    fn open(&mut self) -> Result<DeviceIdentity> {
        let (name, vram_bytes) = self.scrape()?;
        let vendor = classify_vendor(&name);

        Ok(DeviceIdentity::new(BackendKind::CommandScrape, vendor, name)
            .with_memory(vram_bytes.unwrap_or(0), MemoryUnit::Bytes))
    }

    fn poll(&mut self) -> RawReading {
        RawReading::default()
    }
}
