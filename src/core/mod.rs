// Core business logic module

pub mod config;
pub mod gpu;

// Re-export commonly used items
pub use config::Config;
pub use gpu::{BackendKind, Detector, DetectorState, DeviceIdentity, MetricsSnapshot, Telemetry};
