//! AMD backend for Windows.
//!
//! Identity comes from the first AMD `Win32_VideoController`; live load and
//! VRAM usage come from the GPU performance counter classes (Windows 10
//! 1709+). Counter instances are keyed by adapter LUID; only the adapter
//! with the most dedicated memory in use is read, which keeps an integrated
//! GPU out of the numbers. Temperature, clocks and power are not exposed
//! there and stay unknown.

#[cfg(windows)]
use std::collections::HashMap;
#[cfg(windows)]
use wmi::{Variant, WMIConnection};

use super::inventory::{first_controller, query_video_controllers};
use crate::core::gpu::{
    BackendKind, DeviceIdentity, GpuBackend, GpuVendor, MemoryUnit, PowerUnit, RawReading,
};
#[cfg(windows)]
use crate::core::gpu::read_field;
use crate::error::{GpuError, Result};

#[cfg(windows)]
const ENGINE_QUERY: &str = "SELECT Name, UtilizationPercentage FROM \
    Win32_PerfFormattedData_GPUPerformanceCounters_GPUEngine \
    WHERE Name LIKE '%engtype_3D'";

#[cfg(windows)]
const MEMORY_QUERY: &str = "SELECT Name, DedicatedUsage FROM \
    Win32_PerfFormattedData_GPUPerformanceCounters_GPUAdapterMemory";

/// AMD GPU backend using WMI on Windows
#[derive(Default)]
pub struct AmdWindowsBackend {
    opened: bool,
}

impl AmdWindowsBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GpuBackend for AmdWindowsBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::AmdWindows
    }

    fn open(&mut self) -> Result<DeviceIdentity> {
        let controllers = query_video_controllers(BackendKind::AmdWindows)?;

        let identity = first_controller(&controllers, |c| c.vendor() == GpuVendor::Amd)
            .map(|c| c.to_identity(BackendKind::AmdWindows))
            .ok_or_else(|| GpuError::unavailable(BackendKind::AmdWindows, "No AMD adapter"))?;

        self.opened = true;
        Ok(identity)
    }

    fn poll(&mut self) -> RawReading {
        #[cfg_attr(not(windows), allow(unused_mut))]
        let mut reading = RawReading::new(MemoryUnit::Bytes, PowerUnit::Watts);
        if !self.opened {
            return reading;
        }

        #[cfg(windows)]
        {
            let wmi_con = match WMIConnection::new() {
                Ok(con) => con,
                Err(e) => {
                    log::debug!("Failed to connect to WMI: {}", e);
                    return reading;
                }
            };

            let memory = read_field(
                "vram_used",
                wmi_con.raw_query::<HashMap<String, Variant>>(MEMORY_QUERY),
            )
            .map(|rows| counter_samples(&rows, "DedicatedUsage"))
            .unwrap_or_default();
            let adapter = discrete_adapter(&memory);

            if !memory.is_empty() {
                reading.vram_used = Some(sum_for_adapter(&memory, adapter) as u64);
            }

            reading.utilization = read_field(
                "utilization",
                wmi_con.raw_query::<HashMap<String, Variant>>(ENGINE_QUERY),
            )
            .map(|rows| {
                let engines = counter_samples(&rows, "UtilizationPercentage");
                sum_for_adapter(&engines, adapter).min(100.0)
            });
        }

        reading
    }
}

#[cfg(windows)]
fn variant_f64(value: &Variant) -> Option<f64> {
    match value {
        Variant::UI8(n) => Some(*n as f64),
        Variant::UI4(n) => Some(*n as f64),
        Variant::UI2(n) => Some(*n as f64),
        Variant::UI1(n) => Some(*n as f64),
        Variant::I8(n) => Some(*n as f64),
        Variant::I4(n) => Some(*n as f64),
        Variant::R8(n) => Some(*n),
        Variant::R4(n) => Some(*n as f64),
        Variant::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// `(instance name, value)` pairs for one counter column
#[cfg(windows)]
fn counter_samples(rows: &[HashMap<String, Variant>], column: &str) -> Vec<(String, f64)> {
    rows.iter()
        .filter_map(|row| {
            let name = match row.get("Name") {
                Some(Variant::String(name)) => name.clone(),
                _ => String::new(),
            };
            Some((name, row.get(column).and_then(variant_f64)?))
        })
        .collect()
}

/// `luid_0x..._0x...` part of a counter instance name
#[cfg_attr(not(windows), allow(dead_code))]
fn adapter_luid(instance: &str) -> Option<&str> {
    let start = instance.find("luid_")?;
    let rest = &instance[start..];
    let mut parts = rest.split('_').skip(1);
    let high = parts.next().filter(|p| p.starts_with("0x"))?;
    let low = parts.next().filter(|p| p.starts_with("0x"))?;
    Some(&rest[..5 + high.len() + 1 + low.len()])
}

/// LUID of the adapter with the most dedicated memory in use
#[cfg_attr(not(windows), allow(dead_code))]
fn discrete_adapter(memory: &[(String, f64)]) -> Option<&str> {
    let mut totals: Vec<(&str, f64)> = Vec::new();
    for (name, value) in memory {
        let Some(luid) = adapter_luid(name) else {
            continue;
        };
        match totals.iter_mut().find(|(l, _)| *l == luid) {
            Some((_, total)) => *total += value,
            None => totals.push((luid, *value)),
        }
    }

    totals
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(luid, _)| luid)
}

/// Sum samples belonging to `adapter`, or every sample when no LUID is known
#[cfg_attr(not(windows), allow(dead_code))]
fn sum_for_adapter(samples: &[(String, f64)], adapter: Option<&str>) -> f64 {
    samples
        .iter()
        .filter(|(name, _)| adapter.map_or(true, |luid| adapter_luid(name) == Some(luid)))
        .map(|(_, value)| value)
        .sum()
}
