#[cfg(feature = "nvml")]
use nvml_wrapper::{
    enum_wrappers::device::{Clock, TemperatureSensor},
    Device, Nvml,
};
#[cfg(feature = "nvml")]
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::gpu::{BackendKind, DeviceIdentity, GpuBackend, RawReading};
#[cfg(feature = "nvml")]
use crate::core::gpu::{read_field, GpuVendor, MemoryUnit, PowerUnit};
use crate::error::{GpuError, Result};

/// Set while an [`NvmlSession`] is alive; NVML is initialized at most once
#[cfg(feature = "nvml")]
static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Owning handle over the process-wide NVML library state.
///
/// Only one session can be live at a time. Dropping it shuts NVML down,
/// so every exit path (failed probe, normal teardown, Ctrl-C in the CLI)
/// releases the library exactly once.
#[cfg(feature = "nvml")]
pub struct NvmlSession {
    // Field order matters: nvmlShutdown runs before the flag is cleared.
    nvml: Nvml,
    _guard: SessionGuard,
}

/// Clears [`SESSION_ACTIVE`] when dropped
#[cfg(feature = "nvml")]
struct SessionGuard;

#[cfg(feature = "nvml")]
impl SessionGuard {
    fn claim() -> Option<Self> {
        SESSION_ACTIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| SessionGuard)
    }
}

#[cfg(feature = "nvml")]
impl Drop for SessionGuard {
    fn drop(&mut self) {
        log::debug!("Releasing NVML session");
        SESSION_ACTIVE.store(false, Ordering::SeqCst);
    }
}

#[cfg(feature = "nvml")]
impl NvmlSession {
    pub fn acquire() -> Result<Self> {
        let guard = SessionGuard::claim().ok_or_else(|| {
            GpuError::unavailable(
                BackendKind::Nvml,
                "NVML is already initialized in this process",
            )
        })?;

        let nvml = Nvml::init().map_err(|e| {
            GpuError::unavailable(BackendKind::Nvml, format!("Failed to init NVML: {}", e))
        })?;

        log::debug!("NVML session acquired");
        Ok(Self {
            nvml,
            _guard: guard,
        })
    }

    pub fn nvml(&self) -> &Nvml {
        &self.nvml
    }
}

/// NVIDIA backend using NVML
pub struct NvidiaBackend {
    #[cfg(feature = "nvml")]
    session: Option<NvmlSession>,
    #[cfg_attr(not(feature = "nvml"), allow(dead_code))]
    device_index: u32,
}

impl NvidiaBackend {
    pub fn new() -> Self {
        Self::with_device_index(0)
    }

    /// Create a backend for a specific GPU index
    pub fn with_device_index(index: u32) -> Self {
        Self {
            #[cfg(feature = "nvml")]
            session: None,
            device_index: index,
        }
    }

    #[cfg(feature = "nvml")]
    fn get_device<'a>(&self, session: &'a NvmlSession) -> Result<Device<'a>> {
        session.nvml().device_by_index(self.device_index).map_err(|e| {
            GpuError::unavailable(
                BackendKind::Nvml,
                format!("GPU {} not found: {}", self.device_index, e),
            )
        })
    }
}

impl Default for NvidiaBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuBackend for NvidiaBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Nvml
    }

    fn open(&mut self) -> Result<DeviceIdentity> {
        #[cfg(feature = "nvml")]
        {
            // A failed probe drops `session` here, which shuts NVML down again.
            let session = NvmlSession::acquire()?;

            let count = session.nvml().device_count().map_err(|e| {
                GpuError::unavailable(BackendKind::Nvml, format!("Failed to get device count: {}", e))
            })?;
            if count <= self.device_index {
                return Err(GpuError::unavailable(
                    BackendKind::Nvml,
                    format!("GPU {} not found ({} device(s) present)", self.device_index, count),
                ));
            }

            let identity = {
                let device = self.get_device(&session)?;
                let name = device
                    .name()
                    .unwrap_or_else(|_| "Unknown NVIDIA GPU".to_string());

                let memory_total = read_field("memory_total", device.memory_info())
                    .map(|m| m.total)
                    .unwrap_or(0);

                let driver = session.nvml().sys_driver_version().unwrap_or_default();

                DeviceIdentity::new(BackendKind::Nvml, GpuVendor::Nvidia, name)
                    .with_memory(memory_total, MemoryUnit::Bytes)
                    .with_driver(driver)
            };

            self.session = Some(session);
            Ok(identity)
        }
        #[cfg(not(feature = "nvml"))]
        {
            Err(GpuError::unavailable(
                BackendKind::Nvml,
                "NVIDIA GPU support not enabled",
            ))
        }
    }

    fn poll(&mut self) -> RawReading {
        #[cfg(feature = "nvml")]
        {
            let mut reading = RawReading::new(MemoryUnit::Bytes, PowerUnit::Milliwatts);

            let Some(session) = self.session.as_ref() else {
                return reading;
            };
            let device = match self.get_device(session) {
                Ok(device) => device,
                Err(e) => {
                    log::debug!("{}", e);
                    return reading;
                }
            };

            reading.utilization =
                read_field("utilization", device.utilization_rates()).map(|u| u.gpu as f64);
            reading.temperature = read_field("temperature", device.temperature(TemperatureSensor::Gpu))
                .map(|t| t as f64);

            if let Some(memory) = read_field("memory", device.memory_info()) {
                reading.vram_used = Some(memory.used);
                reading.vram_total = Some(memory.total);
            }

            reading.core_clock_mhz = read_field("core_clock", device.clock_info(Clock::Graphics));
            reading.memory_clock_mhz = read_field("memory_clock", device.clock_info(Clock::Memory));
            reading.power = read_field("power", device.power_usage()).map(|mw| mw as f64);

            reading
        }
        #[cfg(not(feature = "nvml"))]
        {
            RawReading::default()
        }
    }
}
