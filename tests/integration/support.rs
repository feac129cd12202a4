// Scripted backends shared by the integration tests

use gpuscope::core::gpu::{MemoryUnit, PowerUnit};
use gpuscope::{BackendKind, DeviceIdentity, GpuBackend, GpuError, GpuVendor, RawReading};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Backend whose probe result and poll output are fixed up front
pub struct ScriptedBackend {
    pub kind: BackendKind,
    pub identity: Option<DeviceIdentity>,
    pub reading: RawReading,
    pub polls: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn available(kind: BackendKind, vendor: GpuVendor, name: &str) -> Self {
        Self {
            kind,
            identity: Some(DeviceIdentity::new(kind, vendor, name)),
            reading: RawReading::default(),
            polls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unavailable(kind: BackendKind) -> Self {
        Self {
            kind,
            identity: None,
            reading: RawReading::default(),
            polls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_reading(mut self, reading: RawReading) -> Self {
        self.reading = reading;
        self
    }

    pub fn boxed(self) -> Box<dyn GpuBackend> {
        Box::new(self)
    }
}

impl GpuBackend for ScriptedBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn open(&mut self) -> gpuscope::Result<DeviceIdentity> {
        self.identity
            .clone()
            .ok_or_else(|| GpuError::unavailable(self.kind, "scripted failure"))
    }

    fn poll(&mut self) -> RawReading {
        self.polls.fetch_add(1, Ordering::SeqCst);
        self.reading
    }
}

/// Full reading from a vendor library reporting bytes and milliwatts
pub fn full_library_reading() -> RawReading {
    RawReading {
        utilization: Some(92.0),
        temperature: Some(61.0),
        vram_used: Some(4096 * 1024 * 1024),
        vram_total: Some(8192 * 1024 * 1024),
        core_clock_mhz: Some(1800),
        memory_clock_mhz: Some(9500),
        power: Some(180_000.0),
        ..RawReading::new(MemoryUnit::Bytes, PowerUnit::Milliwatts)
    }
}
