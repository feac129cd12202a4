use humansize::{format_size, BINARY};

use crate::core::gpu::{DeviceIdentity, MetricsSnapshot, NOT_AVAILABLE};

/// Format a byte count in human-readable binary units, `N/A` for 0
pub fn format_memory(bytes: u64) -> String {
    if bytes == 0 {
        return NOT_AVAILABLE.to_string();
    }
    format_size(bytes, BINARY)
}

pub fn format_percent(value: Option<u32>) -> String {
    value
        .map(|v| format!("{}%", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_temperature(value: Option<u32>) -> String {
    value
        .map(|v| format!("{}°C", v))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_clock(mhz: u32) -> String {
    if mhz == 0 {
        return NOT_AVAILABLE.to_string();
    }
    format!("{} MHz", mhz)
}

pub fn format_power(watts: f32) -> String {
    if watts <= 0.0 {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2} W", watts)
}

/// "used MB / total MB", or `N/A` when the total is unknown
pub fn format_vram(snapshot: &MetricsSnapshot) -> String {
    if snapshot.vram_total_mb == 0 {
        return NOT_AVAILABLE.to_string();
    }
    format!("{} MB / {} MB", snapshot.vram_used_mb, snapshot.vram_total_mb)
}

/// Label/value rows describing a detected device
pub fn identity_rows(identity: &DeviceIdentity) -> Vec<(&'static str, String)> {
    vec![
        ("GPU Model", identity.name.clone()),
        ("Vendor", identity.vendor.to_string()),
        ("Memory", format_memory(identity.memory_total_bytes)),
        ("Driver", identity.driver_version.clone()),
        (
            "Backend",
            identity
                .backend
                .map(|b| b.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        (
            "Live monitoring",
            if identity.can_poll_live { "yes" } else { "no" }.to_string(),
        ),
    ]
}

/// Single-line summary of a snapshot for the watch loop
pub fn snapshot_line(snapshot: &MetricsSnapshot) -> String {
    format!(
        "load {:>4}  temp {:>5}  vram {:>19}  core {:>9}  mem {:>9}  power {:>8}",
        format_percent(snapshot.utilization_percent),
        format_temperature(snapshot.temperature_celsius),
        format_vram(snapshot),
        format_clock(snapshot.core_clock_mhz),
        format_clock(snapshot.memory_clock_mhz),
        format_power(snapshot.power_draw_watts),
    )
}
