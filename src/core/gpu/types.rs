use serde::{Deserialize, Serialize};
use std::fmt;

use super::backend::BackendKind;
use super::normalize::{MemoryUnit, PowerUnit};

/// Placeholder for text fields a backend cannot supply
pub const NOT_AVAILABLE: &str = "N/A";

/// Name reported when every backend fails
pub const NO_GPU_NAME: &str = "No GPU Detected";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
    Generic,
    #[default]
    Unknown,
}

impl fmt::Display for GpuVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GpuVendor::Nvidia => "NVIDIA",
            GpuVendor::Amd => "AMD",
            GpuVendor::Intel => "Intel",
            GpuVendor::Generic => "Generic",
            GpuVendor::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Identity of the GPU a backend committed to.
///
/// Built once during detection and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub vendor: GpuVendor,
    pub name: String,
    /// Total memory in bytes (0 = unknown)
    pub memory_total_bytes: u64,
    pub driver_version: String,
    pub can_poll_live: bool,
    /// Backend that produced this identity, `None` for the sentinel
    pub backend: Option<BackendKind>,
}

impl DeviceIdentity {
    pub fn new(backend: BackendKind, vendor: GpuVendor, name: impl Into<String>) -> Self {
        Self {
            vendor,
            name: name.into(),
            memory_total_bytes: 0,
            driver_version: NOT_AVAILABLE.to_string(),
            can_poll_live: backend.can_poll_live(),
            backend: Some(backend),
        }
    }

    /// Set total memory from a value in the backend's native unit
    pub fn with_memory(mut self, amount: u64, unit: MemoryUnit) -> Self {
        self.memory_total_bytes = unit.to_bytes(amount);
        self
    }

    /// Set the driver version, ignoring blank strings
    pub fn with_driver(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        let version = version.trim();
        if !version.is_empty() {
            self.driver_version = version.to_string();
        }
        self
    }

    /// Sentinel identity used when detection fails
    pub fn none() -> Self {
        Self {
            vendor: GpuVendor::Unknown,
            name: NO_GPU_NAME.to_string(),
            memory_total_bytes: 0,
            driver_version: NOT_AVAILABLE.to_string(),
            can_poll_live: false,
            backend: None,
        }
    }

    pub fn is_detected(&self) -> bool {
        self.backend.is_some()
    }
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self::none()
    }
}

/// One normalized, point-in-time set of live GPU metrics.
///
/// `Default` is the all-unknown snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub utilization_percent: Option<u32>,
    pub temperature_celsius: Option<u32>,
    /// Megabytes, 0 = unknown
    pub vram_used_mb: u64,
    /// Megabytes, 0 = unknown
    pub vram_total_mb: u64,
    /// 0 = unknown
    pub core_clock_mhz: u32,
    /// 0 = unknown
    pub memory_clock_mhz: u32,
    /// 0.0 = unknown
    pub power_draw_watts: f32,
}

impl MetricsSnapshot {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::default()
    }

    pub fn vram_percent(&self) -> Option<f32> {
        if self.vram_total_mb == 0 {
            return None;
        }
        Some(self.vram_used_mb as f32 / self.vram_total_mb as f32 * 100.0)
    }
}

/// Raw reading returned by a backend's poll, in the backend's native units
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawReading {
    /// Percent, may be fractional
    pub utilization: Option<f64>,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    pub vram_used: Option<u64>,
    pub vram_total: Option<u64>,
    pub memory_unit: MemoryUnit,
    pub core_clock_mhz: Option<u32>,
    pub memory_clock_mhz: Option<u32>,
    pub power: Option<f64>,
    pub power_unit: PowerUnit,
}

impl RawReading {
    pub fn new(memory_unit: MemoryUnit, power_unit: PowerUnit) -> Self {
        Self {
            memory_unit,
            power_unit,
            ..Default::default()
        }
    }
}
