use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::types::{DeviceIdentity, RawReading};
use crate::error::{GpuError, Result};
use crate::platform::Platform;

/// Every detection/monitoring method, in strict probe priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// NVIDIA Management Library
    Nvml,
    /// amdgpu driver sysfs tree (Linux)
    #[serde(alias = "amd_sysfs")]
    AmdSysfs,
    /// WMI performance counters for AMD adapters (Windows)
    #[serde(alias = "amd_windows")]
    AmdWindows,
    /// SMI query tool CSV output
    #[serde(alias = "smi_query")]
    SmiQuery,
    /// Win32_VideoController inventory (Windows)
    #[serde(alias = "wmi_inventory")]
    WmiInventory,
    /// lspci / system_profiler output
    #[serde(alias = "command_scrape")]
    CommandScrape,
}

impl BackendKind {
    pub const PRIORITY: [BackendKind; 6] = [
        BackendKind::Nvml,
        BackendKind::AmdSysfs,
        BackendKind::AmdWindows,
        BackendKind::SmiQuery,
        BackendKind::WmiInventory,
        BackendKind::CommandScrape,
    ];

    /// Whether this backend is even attempted on the given platform
    pub fn supports(self, platform: Platform) -> bool {
        match self {
            BackendKind::Nvml | BackendKind::SmiQuery => true,
            BackendKind::AmdSysfs => platform == Platform::Linux,
            BackendKind::AmdWindows | BackendKind::WmiInventory => platform == Platform::Windows,
            BackendKind::CommandScrape => {
                matches!(platform, Platform::Linux | Platform::MacOs)
            }
        }
    }

    /// Inventory-only backends never support live polling
    pub fn can_poll_live(self) -> bool {
        !matches!(self, BackendKind::WmiInventory | BackendKind::CommandScrape)
    }

    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Nvml => "nvml",
            BackendKind::AmdSysfs => "amd-sysfs",
            BackendKind::AmdWindows => "amd-windows",
            BackendKind::SmiQuery => "smi-query",
            BackendKind::WmiInventory => "wmi-inventory",
            BackendKind::CommandScrape => "command-scrape",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = GpuError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        BackendKind::PRIORITY
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| GpuError::config(format!("Unknown backend: {}", s)))
    }
}

/// Trait for GPU detection and telemetry backends
///
/// Implementations live in the platform layer. `open` may fail freely;
/// callers go through `probe`, which never lets an error escape.
pub trait GpuBackend: Send {
    fn kind(&self) -> BackendKind;

    /// Initialize the underlying library and enumerate the first device
    fn open(&mut self) -> Result<DeviceIdentity>;

    /// Read live metrics in native units. Only valid after a successful probe.
    fn poll(&mut self) -> RawReading;

    fn probe(&mut self) -> Option<DeviceIdentity> {
        match self.open() {
            Ok(identity) => Some(identity),
            Err(e) => {
                log::debug!("{} probe failed: {}", self.kind(), e);
                None
            }
        }
    }
}

/// Downgrade one failed metric read to unknown, logging the failure
pub(crate) fn read_field<T, E: fmt::Display>(
    field: &'static str,
    result: std::result::Result<T, E>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("{}", GpuError::partial_read(field, e.to_string()));
            None
        }
    }
}
