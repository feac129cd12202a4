//! GPU backend implementations.
//!
//! Provides one backend per detection method. NVIDIA via NVML, AMD via the
//! amdgpu sysfs tree (Linux) or WMI counters (Windows), the SMI query tool,
//! WMI inventory, and inventory command scraping.

mod amd_sysfs;
mod amd_windows;
mod inventory;
mod nvidia;
mod scrape;
mod smi;

pub use amd_sysfs::{parse_active_dpm_level, AmdSysfsBackend};
pub use amd_windows::AmdWindowsBackend;
pub use inventory::{VideoController, WmiInventoryBackend};
#[cfg(feature = "nvml")]
pub use nvidia::NvmlSession;
pub use nvidia::NvidiaBackend;
pub use scrape::{parse_lspci, parse_system_profiler, CommandScrapeBackend};
pub use smi::{parse_smi_csv, SmiQueryBackend, SmiRow};

use crate::core::config::Config;
use crate::core::gpu::{BackendKind, GpuBackend};
use crate::platform::Platform;

/// Construct the backend for one kind
pub fn backend_for(kind: BackendKind, config: &Config, platform: Platform) -> Box<dyn GpuBackend> {
    match kind {
        BackendKind::Nvml => Box::new(NvidiaBackend::new()),
        BackendKind::AmdSysfs => Box::new(AmdSysfsBackend::new(config.drm_root.clone())),
        BackendKind::AmdWindows => Box::new(AmdWindowsBackend::new()),
        BackendKind::SmiQuery => Box::new(SmiQueryBackend::new(config.smi_command.clone())),
        BackendKind::WmiInventory => Box::new(WmiInventoryBackend::new()),
        BackendKind::CommandScrape => Box::new(CommandScrapeBackend::new(platform)),
    }
}

/// Backend kinds attempted on `platform`, in priority order
pub fn enabled_kinds(config: &Config, platform: Platform) -> Vec<BackendKind> {
    BackendKind::PRIORITY
        .into_iter()
        .filter(|kind| kind.supports(platform) && config.is_enabled(*kind))
        .collect()
}

/// Default backend set for `platform`, highest priority first
pub fn default_backends(config: &Config, platform: Platform) -> Vec<Box<dyn GpuBackend>> {
    enabled_kinds(config, platform)
        .into_iter()
        .map(|kind| backend_for(kind, config, platform))
        .collect()
}
