// Platform-specific code module

pub mod command;
pub mod gpu;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host OS family, used to gate which GPU backends are attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Parse an OS name as reported by `std::env::consts::OS` or `uname`
    pub fn from_os_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            "macos" | "darwin" => Platform::MacOs,
            _ => Platform::Other,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
            Platform::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Human-readable description of the host, e.g. "Ubuntu 24.04 (Linux)"
pub fn host_description() -> String {
    let name = sysinfo::System::name().unwrap_or_else(|| "Unknown".to_string());
    match sysinfo::System::os_version() {
        Some(version) => format!("{} {} ({})", name, version, Platform::current()),
        None => format!("{} ({})", name, Platform::current()),
    }
}
