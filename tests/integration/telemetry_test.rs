use super::support::{full_library_reading, ScriptedBackend};
use gpuscope::core::gpu::{MemoryUnit, PowerUnit};
use gpuscope::{BackendKind, Detector, GpuVendor, MetricsSnapshot, RawReading};
use std::sync::atomic::Ordering;
use std::thread;

#[test]
fn test_end_to_end_snapshot() {
    let mut detector = Detector::new(vec![ScriptedBackend::available(
        BackendKind::Nvml,
        GpuVendor::Nvidia,
        "NVIDIA GeForce RTX 3070",
    )
    .with_reading(full_library_reading())
    .boxed()]);
    detector.detect();

    let snapshot = detector.telemetry().snapshot();

    assert_eq!(
        snapshot,
        MetricsSnapshot {
            utilization_percent: Some(92),
            temperature_celsius: Some(61),
            vram_used_mb: 4096,
            vram_total_mb: 8192,
            core_clock_mhz: 1800,
            memory_clock_mhz: 9500,
            power_draw_watts: 180.0,
        }
    );
}

#[test]
fn test_partial_failure_keeps_other_fields() {
    let reading = RawReading {
        temperature: None,
        ..full_library_reading()
    };
    let mut detector = Detector::new(vec![ScriptedBackend::available(
        BackendKind::Nvml,
        GpuVendor::Nvidia,
        "NVIDIA GeForce RTX 3070",
    )
    .with_reading(reading)
    .boxed()]);
    detector.detect();

    let snapshot = detector.telemetry().snapshot();

    assert_eq!(snapshot.temperature_celsius, None);
    assert_eq!(snapshot.utilization_percent, Some(92));
    assert_eq!(snapshot.vram_used_mb, 4096);
    assert_eq!(snapshot.power_draw_watts, 180.0);
}

#[test]
fn test_inventory_backend_is_never_polled() {
    let backend = ScriptedBackend::available(
        BackendKind::WmiInventory,
        GpuVendor::Amd,
        "AMD Radeon RX 6600",
    )
    .with_reading(full_library_reading());
    let polls = backend.polls.clone();

    let mut detector = Detector::new(vec![backend.boxed()]);
    detector.detect();
    let telemetry = detector.telemetry();

    assert!(!telemetry.is_live());
    assert!(telemetry.snapshot().is_unknown());
    assert_eq!(polls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_telemetry_before_detection_is_idle() {
    let backend = ScriptedBackend::available(BackendKind::Nvml, GpuVendor::Nvidia, "RTX");
    let polls = backend.polls.clone();
    let detector = Detector::new(vec![backend.boxed()]);

    assert!(detector.telemetry().snapshot().is_unknown());
    assert_eq!(polls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_total_falls_back_to_identity_memory() {
    let mut backend = ScriptedBackend::available(BackendKind::AmdWindows, GpuVendor::Amd, "RX 580")
        .with_reading(RawReading {
            vram_used: Some(2048 * 1024 * 1024),
            ..RawReading::new(MemoryUnit::Bytes, PowerUnit::Watts)
        });
    backend.identity = backend
        .identity
        .take()
        .map(|identity| identity.with_memory(8, MemoryUnit::Gibibytes));

    let mut detector = Detector::new(vec![backend.boxed()]);
    detector.detect();
    let snapshot = detector.telemetry().snapshot();

    assert_eq!(snapshot.vram_total_mb, 8192);
    assert_eq!(snapshot.vram_used_mb, 2048);
}

#[test]
fn test_concurrent_snapshots_share_backend() {
    let backend = ScriptedBackend::available(BackendKind::Nvml, GpuVendor::Nvidia, "RTX")
        .with_reading(full_library_reading());
    let polls = backend.polls.clone();

    let mut detector = Detector::new(vec![backend.boxed()]);
    detector.detect();
    let telemetry = detector.telemetry();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let telemetry = telemetry.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    assert_eq!(telemetry.snapshot().utilization_percent, Some(92));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(polls.load(Ordering::SeqCst), 100);
    assert_eq!(telemetry.identity().name, "RTX");
}
