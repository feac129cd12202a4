//! Windows GPU inventory through WMI `Win32_VideoController`.
//!
//! Inventory data only: the backend reports an identity but never polls.

use serde::Deserialize;
#[cfg(windows)]
use winreg::{enums::HKEY_LOCAL_MACHINE, RegKey};
#[cfg(windows)]
use wmi::WMIConnection;

use crate::core::gpu::{
    classify_vendor, BackendKind, DeviceIdentity, GpuBackend, GpuVendor, MemoryUnit, RawReading,
};
use crate::error::{GpuError, Result};

/// `AdapterRAM` is a uint32; anything at or above this is the saturated value
const ADAPTER_RAM_CAP: u64 = 0xFFF0_0000;

/// Display adapter device class
#[cfg(windows)]
const DISPLAY_CLASS_KEY: &str =
    r"SYSTEM\CurrentControlSet\Control\Class\{4d36e968-e325-11ce-bfc1-08002be10318}";

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename = "Win32_VideoController")]
#[serde(rename_all = "PascalCase")]
pub struct VideoController {
    pub name: Option<String>,
    /// Bytes; capped at 4 GiB by the WMI schema
    #[serde(rename = "AdapterRAM")]
    pub adapter_ram: Option<u64>,
    pub driver_version: Option<String>,
}

impl VideoController {
    pub fn vendor(&self) -> GpuVendor {
        classify_vendor(self.name.as_deref().unwrap_or_default())
    }

    fn is_basic_display(&self) -> bool {
        self.name
            .as_deref()
            .map(|n| n.contains("Basic Display") || n.contains("Microsoft Basic"))
            .unwrap_or(true)
    }

    /// Dedicated memory in bytes, 0 when unknown.
    ///
    /// `AdapterRAM` saturates at 4 GiB, so larger cards are looked up in the
    /// driver's registry entry instead. A saturated value with no registry
    /// entry is reported as unknown rather than as 4 GiB.
    pub fn memory_bytes(&self) -> u64 {
        match self.adapter_ram {
            Some(ram) if ram > 0 && ram < ADAPTER_RAM_CAP => ram,
            _ => self
                .name
                .as_deref()
                .and_then(registry_memory_size)
                .unwrap_or(0),
        }
    }

    pub fn to_identity(&self, backend: BackendKind) -> DeviceIdentity {
        let name = self.name.clone().unwrap_or_default();
        DeviceIdentity::new(backend, self.vendor(), name)
            .with_memory(self.memory_bytes(), MemoryUnit::Bytes)
            .with_driver(self.driver_version.clone().unwrap_or_default())
    }
}

/// Decode `HardwareInformation.qwMemorySize` (QWORD) or `MemorySize`
/// (DWORD or binary), both little-endian
pub fn parse_memory_size(bytes: &[u8]) -> Option<u64> {
    let size = match bytes.len() {
        n if n >= 8 => u64::from_le_bytes(bytes[..8].try_into().ok()?),
        n if n >= 4 => u32::from_le_bytes(bytes[..4].try_into().ok()?) as u64,
        _ => return None,
    };
    (size > 0).then_some(size)
}

/// Memory size from the display class entry whose `DriverDesc` is `name`
#[cfg(windows)]
fn registry_memory_size(name: &str) -> Option<u64> {
    let class = match RegKey::predef(HKEY_LOCAL_MACHINE).open_subkey(DISPLAY_CLASS_KEY) {
        Ok(key) => key,
        Err(e) => {
            log::debug!("Cannot open display class key: {}", e);
            return None;
        }
    };

    class
        .enum_keys()
        .flatten()
        .filter_map(|sub| class.open_subkey(&sub).ok())
        .filter(|key| {
            key.get_value::<String, _>("DriverDesc")
                .map(|desc| desc.trim() == name.trim())
                .unwrap_or(false)
        })
        .find_map(|key| {
            ["HardwareInformation.qwMemorySize", "HardwareInformation.MemorySize"]
                .iter()
                .filter_map(|value| key.get_raw_value(value).ok())
                .find_map(|raw| parse_memory_size(&raw.bytes))
        })
}

#[cfg(not(windows))]
fn registry_memory_size(_name: &str) -> Option<u64> {
    None
}

/// First real display adapter matching `accept`, skipping the Microsoft
/// basic display driver
pub fn first_controller<F>(controllers: &[VideoController], accept: F) -> Option<&VideoController>
where
    F: Fn(&VideoController) -> bool,
{
    controllers
        .iter()
        .filter(|c| !c.is_basic_display())
        .find(|c| accept(c))
}

#[cfg(windows)]
pub fn query_video_controllers(backend: BackendKind) -> Result<Vec<VideoController>> {
    let wmi_con = WMIConnection::new().map_err(|e| {
        GpuError::unavailable(backend, format!("Failed to connect to WMI: {}", e))
    })?;

    wmi_con
        .query()
        .map_err(|e| GpuError::unavailable(backend, format!("WMI query failed: {}", e)))
}

#[cfg(not(windows))]
pub fn query_video_controllers(backend: BackendKind) -> Result<Vec<VideoController>> {
    Err(GpuError::unavailable(backend, "WMI is only available on Windows"))
}

/// Identity-only backend over `Win32_VideoController`
#[derive(Default)]
pub struct WmiInventoryBackend;

impl WmiInventoryBackend {
    pub fn new() -> Self {
        Self
    }
}

impl GpuBackend for WmiInventoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::WmiInventory
    }

    fn open(&mut self) -> Result<DeviceIdentity> {
        let controllers = query_video_controllers(BackendKind::WmiInventory)?;

        first_controller(&controllers, |_| true)
            .map(|c| c.to_identity(BackendKind::WmiInventory))
            .ok_or_else(|| GpuError::unavailable(BackendKind::WmiInventory, "No video controller"))
    }

    fn poll(&mut self) -> RawReading {
        RawReading::default()
    }
}
