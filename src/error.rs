use std::io;
use thiserror::Error;

use crate::core::gpu::BackendKind;

/// Custom error type for gpuscope
///
/// None of these cross the detector/poller boundary: detection turns them
/// into "no result" and polling turns them into unknown fields.
#[derive(Error, Debug)]
pub enum GpuError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{backend} unavailable: {reason}")]
    AdapterUnavailable { backend: BackendKind, reason: String },

    #[error("failed to read {field}: {reason}")]
    PartialRead { field: &'static str, reason: String },

    #[error("No GPU detected: every backend was exhausted")]
    NoDeviceFound,

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for gpuscope
pub type Result<T> = std::result::Result<T, GpuError>;

impl GpuError {
    /// Create an adapter-unavailable error for the given backend
    pub fn unavailable<S: Into<String>>(backend: BackendKind, reason: S) -> Self {
        GpuError::AdapterUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// Create a partial read error for one metric field
    pub fn partial_read<S: Into<String>>(field: &'static str, reason: S) -> Self {
        GpuError::PartialRead {
            field,
            reason: reason.into(),
        }
    }

    pub fn command<S: Into<String>>(msg: S) -> Self {
        GpuError::Command(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        GpuError::Config(msg.into())
    }
}
