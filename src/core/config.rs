use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::gpu::BackendKind;

pub const DEFAULT_DRM_ROOT: &str = "/sys/class/drm";
pub const DEFAULT_SMI_COMMAND: &str = "nvidia-smi";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backends never attempted during detection
    #[serde(deserialize_with = "deserialize_backend_list")]
    pub disabled_backends: Vec<BackendKind>,
    /// Root of the DRM class tree read by the amdgpu sysfs backend
    pub drm_root: PathBuf,
    /// Executable used by the SMI query backend
    pub smi_command: String,
    /// Default cadence for `gpuscope watch`
    pub poll_interval_ms: u64,
}

/// Accept any spelling `BackendKind::from_str` knows and skip unknown
/// entries, so one typo does not discard the rest of the file
fn deserialize_backend_list<'de, D>(deserializer: D) -> std::result::Result<Vec<BackendKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = Vec::<String>::deserialize(deserializer)?;
    Ok(names
        .iter()
        .filter_map(|name| match name.parse::<BackendKind>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                log::warn!("Ignoring disabled backend entry: {}", e);
                None
            }
        })
        .collect())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            disabled_backends: Vec::new(),
            drm_root: PathBuf::from(DEFAULT_DRM_ROOT),
            smi_command: DEFAULT_SMI_COMMAND.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = match fs::read(config_path) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Ignoring unreadable config {:?}: {}", config_path, e);
                return Ok(Config::default());
            }
        };

        // If the file is empty or corrupted, return default config
        if data.is_empty() {
            return Ok(Config::default());
        }

        Ok(serde_json::from_slice(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable config {:?}: {}", config_path, e);
            Config::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_vec_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("gpuscope").join("config.json"))
    }

    pub fn is_enabled(&self, kind: BackendKind) -> bool {
        !self.disabled_backends.contains(&kind)
    }

    pub fn disable_backend(&mut self, kind: BackendKind) -> bool {
        if self.disabled_backends.contains(&kind) {
            return false;
        }
        self.disabled_backends.push(kind);
        true
    }

    pub fn enable_backend(&mut self, kind: BackendKind) -> bool {
        let before = self.disabled_backends.len();
        self.disabled_backends.retain(|k| *k != kind);
        self.disabled_backends.len() != before
    }
}
