//! Caller-driven polling of the committed backend.

use std::sync::Arc;

use super::detector::SharedBackend;
use super::normalize::normalize;
use super::types::{DeviceIdentity, MetricsSnapshot};

/// Polling handle handed out by [`Detector::telemetry`](super::Detector::telemetry).
///
/// Has no timer of its own. Clones share the same backend, and the lock only
/// covers the backend call, so concurrent callers are serialized against the
/// native handle while identity reads stay lock-free.
#[derive(Clone)]
pub struct Telemetry {
    backend: Option<SharedBackend>,
    identity: Arc<DeviceIdentity>,
}

impl Telemetry {
    pub(crate) fn new(backend: Option<SharedBackend>, identity: Arc<DeviceIdentity>) -> Self {
        Self { backend, identity }
    }

    /// Whether snapshots come from a live backend
    pub fn is_live(&self) -> bool {
        self.backend.is_some()
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Take one normalized snapshot.
    ///
    /// Without a live backend this is a no-op returning the all-unknown
    /// snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let Some(backend) = &self.backend else {
            return MetricsSnapshot::unknown();
        };

        let raw = backend.lock().poll();
        normalize(&raw, &self.identity)
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("live", &self.is_live())
            .field("identity", &self.identity.name)
            .finish()
    }
}
