//! GPU detection and telemetry core.
//!
//! Backends (in the platform layer) are probed once by the [`Detector`],
//! which commits to the first one that finds a device. [`Telemetry`] then
//! polls that backend and normalizes every reading into a
//! [`MetricsSnapshot`].

mod backend;
mod detector;
pub mod normalize;
mod telemetry;
mod types;
pub mod vendor;

pub use backend::{BackendKind, GpuBackend};
pub(crate) use backend::read_field;
pub use detector::{Detector, DetectorState};
pub use normalize::{normalize, MemoryUnit, PowerUnit};
pub use telemetry::Telemetry;
pub use types::{DeviceIdentity, GpuVendor, MetricsSnapshot, RawReading, NOT_AVAILABLE, NO_GPU_NAME};
pub use vendor::classify_vendor;
