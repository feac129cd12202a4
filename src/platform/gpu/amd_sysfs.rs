//! AMD backend reading the amdgpu driver's sysfs tree.
//!
//! Units as exposed by the kernel: VRAM in bytes, temperature in
//! millidegrees Celsius, power in microwatts, clocks in MHz.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::gpu::{
    read_field, vendor::vendor_from_pci_id, BackendKind, DeviceIdentity, GpuBackend, GpuVendor,
    MemoryUnit, PowerUnit, RawReading,
};
use crate::error::{GpuError, Result};

/// AMD GPU backend over `/sys/class/drm/cardN/device`
pub struct AmdSysfsBackend {
    drm_root: PathBuf,
    device_path: Option<PathBuf>,
}

impl AmdSysfsBackend {
    pub fn new(drm_root: impl Into<PathBuf>) -> Self {
        Self {
            drm_root: drm_root.into(),
            device_path: None,
        }
    }

    /// First `cardN/device` whose PCI vendor is AMD
    fn find_amd_card(&self) -> Result<PathBuf> {
        let entries = fs::read_dir(&self.drm_root).map_err(|e| {
            GpuError::unavailable(
                BackendKind::AmdSysfs,
                format!("Cannot read {:?}: {}", self.drm_root, e),
            )
        })?;

        let mut cards: Vec<(u32, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name();
                let index = name.to_str()?.strip_prefix("card")?.parse::<u32>().ok()?;
                Some((index, entry.path().join("device")))
            })
            .collect();
        cards.sort_by_key(|(index, _)| *index);

        cards
            .into_iter()
            .map(|(_, device)| device)
            .find(|device| {
                read_string(&device.join("vendor"))
                    .ok()
                    .and_then(|id| vendor_from_pci_id(&id))
                    == Some(GpuVendor::Amd)
            })
            .ok_or_else(|| GpuError::unavailable(BackendKind::AmdSysfs, "No amdgpu device found"))
    }
}

impl GpuBackend for AmdSysfsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::AmdSysfs
    }

    fn open(&mut self) -> Result<DeviceIdentity> {
        let device = self.find_amd_card()?;

        let name = read_string(&device.join("product_name"))
            .ok()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| match read_string(&device.join("device")) {
                Ok(id) => format!("AMD Radeon Graphics ({})", id),
                Err(_) => "AMD Radeon Graphics".to_string(),
            });

        let memory_total = read_field(
            "memory_total",
            read_value::<u64>(&device.join("mem_info_vram_total")),
        )
        .unwrap_or(0);

        let driver = read_string(&device.join("driver").join("module").join("version"))
            .unwrap_or_default();

        self.device_path = Some(device);

        Ok(
            DeviceIdentity::new(BackendKind::AmdSysfs, GpuVendor::Amd, name)
                .with_memory(memory_total, MemoryUnit::Bytes)
                .with_driver(driver),
        )
    }

    fn poll(&mut self) -> RawReading {
        let mut reading = RawReading::new(MemoryUnit::Bytes, PowerUnit::Microwatts);
        let Some(device) = self.device_path.as_deref() else {
            return reading;
        };

        reading.utilization = read_field(
            "utilization",
            read_value::<f64>(&device.join("gpu_busy_percent")),
        );
        reading.vram_used = read_field(
            "vram_used",
            read_value::<u64>(&device.join("mem_info_vram_used")),
        );
        reading.vram_total = read_field(
            "vram_total",
            read_value::<u64>(&device.join("mem_info_vram_total")),
        );
        reading.core_clock_mhz = read_field("core_clock", read_dpm_level(&device.join("pp_dpm_sclk")));
        reading.memory_clock_mhz =
            read_field("memory_clock", read_dpm_level(&device.join("pp_dpm_mclk")));

        match hwmon_dir(device) {
            Ok(hwmon) => {
                reading.temperature = read_field(
                    "temperature",
                    read_value::<f64>(&hwmon.join("temp1_input")),
                )
                .map(|millidegrees| millidegrees / 1000.0);

                reading.power = read_field(
                    "power",
                    read_value::<f64>(&hwmon.join("power1_average"))
                        .or_else(|_| read_value::<f64>(&hwmon.join("power1_input"))),
                );
            }
            Err(e) => log::debug!("{}", e),
        }

        reading
    }
}

fn read_string(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?.trim().to_string())
}

fn read_value<T>(path: &Path) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = read_string(path)?;
    raw.parse::<T>()
        .map_err(|e| GpuError::partial_read("sysfs value", format!("{:?}: {}", path, e)))
}

/// First hwmon directory under the device, in name order
fn hwmon_dir(device: &Path) -> Result<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(device.join("hwmon"))?
        .flatten()
        .map(|entry| entry.path())
        .collect();
    dirs.sort();
    dirs.into_iter()
        .next()
        .ok_or_else(|| GpuError::partial_read("hwmon", format!("no hwmon under {:?}", device)))
}

fn read_dpm_level(path: &Path) -> Result<u32> {
    let table = read_string(path)?;
    parse_active_dpm_level(&table)
        .ok_or_else(|| GpuError::partial_read("dpm level", format!("no active level in {:?}", path)))
}

/// Parse the active level of a `pp_dpm_*` table, e.g. `1: 1800Mhz *`
pub fn parse_active_dpm_level(table: &str) -> Option<u32> {
    let line = table.lines().find(|line| line.trim_end().ends_with('*'))?;
    let (_, rest) = line.split_once(':')?;
    let value = rest.trim().trim_end_matches('*').trim();
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
