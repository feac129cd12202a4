use parking_lot::Mutex;
use std::sync::Arc;

use super::backend::{BackendKind, GpuBackend};
use super::telemetry::Telemetry;
use super::types::DeviceIdentity;
use crate::core::config::Config;
use crate::error::GpuError;
use crate::platform::{self, Platform};

/// Committed backend, shared with every [`Telemetry`] handle
pub(crate) type SharedBackend = Arc<Mutex<Box<dyn GpuBackend>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Uninitialized,
    Detecting,
    Committed(BackendKind),
    Failed,
}

/// One-shot GPU detection over an ordered list of backends.
///
/// The first backend whose probe succeeds is committed for the lifetime of
/// the detector. Backends that were not committed are dropped right away,
/// which releases any library handle they opened.
pub struct Detector {
    state: DetectorState,
    candidates: Vec<Box<dyn GpuBackend>>,
    identity: Arc<DeviceIdentity>,
    committed: Option<SharedBackend>,
}

impl Detector {
    /// Create a detector over `backends`, highest priority first
    pub fn new(backends: Vec<Box<dyn GpuBackend>>) -> Self {
        Self {
            state: DetectorState::Uninitialized,
            candidates: backends,
            identity: Arc::new(DeviceIdentity::none()),
            committed: None,
        }
    }

    /// Create a detector over the default backend set for `platform`
    pub fn from_config(config: &Config, platform: Platform) -> Self {
        Self::new(platform::gpu::default_backends(config, platform))
    }

    /// Run detection. Calling this again after it finished returns the same
    /// identity without probing anything.
    pub fn detect(&mut self) -> Arc<DeviceIdentity> {
        if self.state != DetectorState::Uninitialized {
            return Arc::clone(&self.identity);
        }

        self.state = DetectorState::Detecting;
        log::debug!(
            "Detecting GPU with {} candidate backend(s)",
            self.candidates.len()
        );

        // Candidates left in the iterator after a commit are dropped unprobed.
        for mut backend in std::mem::take(&mut self.candidates) {
            let kind = backend.kind();

            if let Some(identity) = backend.probe() {
                log::info!(
                    "Detected {} GPU via {}: {}",
                    identity.vendor,
                    kind,
                    identity.name
                );
                self.identity = Arc::new(identity);
                self.committed = Some(Arc::new(Mutex::new(backend)));
                self.state = DetectorState::Committed(kind);
                break;
            }
        }

        if self.committed.is_none() {
            log::warn!("{}", GpuError::NoDeviceFound);
            self.state = DetectorState::Failed;
        }

        Arc::clone(&self.identity)
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn identity(&self) -> Arc<DeviceIdentity> {
        Arc::clone(&self.identity)
    }

    pub fn committed_backend(&self) -> Option<BackendKind> {
        match self.state {
            DetectorState::Committed(kind) => Some(kind),
            _ => None,
        }
    }

    /// Polling handle for the committed backend.
    ///
    /// Before detection, after a failed detection, or for inventory-only
    /// identities the handle holds no backend and every snapshot is unknown.
    pub fn telemetry(&self) -> Telemetry {
        let backend = self
            .committed
            .as_ref()
            .filter(|_| self.identity.can_poll_live)
            .map(Arc::clone);

        Telemetry::new(backend, Arc::clone(&self.identity))
    }
}
