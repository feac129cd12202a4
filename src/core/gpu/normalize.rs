//! Unit normalization from backend-native readings to [`MetricsSnapshot`].
//!
//! Memory always ends up in megabytes (MiB, truncated) and power in watts.

use serde::{Deserialize, Serialize};

use super::types::{DeviceIdentity, MetricsSnapshot, RawReading};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryUnit {
    #[default]
    Bytes,
    Kibibytes,
    Mebibytes,
    Gibibytes,
}

impl MemoryUnit {
    fn bytes_per_unit(self) -> u64 {
        match self {
            MemoryUnit::Bytes => 1,
            MemoryUnit::Kibibytes => KIB,
            MemoryUnit::Mebibytes => MIB,
            MemoryUnit::Gibibytes => GIB,
        }
    }

    pub fn to_bytes(self, amount: u64) -> u64 {
        amount.saturating_mul(self.bytes_per_unit())
    }

    pub fn to_megabytes(self, amount: u64) -> u64 {
        match self {
            MemoryUnit::Bytes => amount / MIB,
            MemoryUnit::Kibibytes => amount / KIB,
            MemoryUnit::Mebibytes => amount,
            MemoryUnit::Gibibytes => amount.saturating_mul(KIB),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUnit {
    Microwatts,
    Milliwatts,
    #[default]
    Watts,
}

impl PowerUnit {
    pub fn to_watts(self, amount: f64) -> f64 {
        match self {
            PowerUnit::Microwatts => amount / 1_000_000.0,
            PowerUnit::Milliwatts => amount / 1_000.0,
            PowerUnit::Watts => amount,
        }
    }
}

/// Convert a raw reading into the canonical snapshot shape.
///
/// `identity` fills in the VRAM total when the backend only reports usage.
pub fn normalize(raw: &RawReading, identity: &DeviceIdentity) -> MetricsSnapshot {
    let utilization_percent = raw
        .utilization
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round().min(100.0) as u32);

    let temperature_celsius = raw
        .temperature
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u32);

    let vram_total_mb = match raw.vram_total {
        Some(total) if total > 0 => raw.memory_unit.to_megabytes(total),
        _ => MemoryUnit::Bytes.to_megabytes(identity.memory_total_bytes),
    };
    let vram_used_mb = raw
        .vram_used
        .map(|used| raw.memory_unit.to_megabytes(used))
        .unwrap_or(0);

    let power_draw_watts = raw
        .power
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| raw.power_unit.to_watts(v) as f32)
        .unwrap_or(0.0);

    MetricsSnapshot {
        utilization_percent,
        temperature_celsius,
        vram_used_mb: clamp_used(vram_used_mb, vram_total_mb),
        vram_total_mb,
        core_clock_mhz: raw.core_clock_mhz.unwrap_or(0),
        memory_clock_mhz: raw.memory_clock_mhz.unwrap_or(0),
        power_draw_watts,
    }
}

/// Keep `used <= total` whenever the total is known
pub fn clamp_used(used: u64, total: u64) -> u64 {
    if total > 0 {
        used.min(total)
    } else {
        used
    }
}
