use super::support::ScriptedBackend;
use gpuscope::{BackendKind, Detector, DetectorState, GpuVendor};

#[test]
fn test_highest_priority_backend_wins() {
    let mut detector = Detector::new(vec![
        ScriptedBackend::available(BackendKind::Nvml, GpuVendor::Nvidia, "NVIDIA GeForce RTX 3070")
            .boxed(),
        ScriptedBackend::available(BackendKind::SmiQuery, GpuVendor::Amd, "AMD Radeon RX 6800")
            .boxed(),
    ]);

    let identity = detector.detect();

    assert_eq!(identity.vendor, GpuVendor::Nvidia);
    assert_eq!(identity.name, "NVIDIA GeForce RTX 3070");
    assert_eq!(identity.backend, Some(BackendKind::Nvml));
    assert_eq!(detector.state(), DetectorState::Committed(BackendKind::Nvml));
}

#[test]
fn test_falls_through_unavailable_backends() {
    let mut detector = Detector::new(vec![
        ScriptedBackend::unavailable(BackendKind::Nvml).boxed(),
        ScriptedBackend::unavailable(BackendKind::AmdSysfs).boxed(),
        ScriptedBackend::available(BackendKind::CommandScrape, GpuVendor::Intel, "Intel UHD 620")
            .boxed(),
    ]);

    let identity = detector.detect();

    assert_eq!(identity.vendor, GpuVendor::Intel);
    assert!(!identity.can_poll_live);
    assert_eq!(detector.committed_backend(), Some(BackendKind::CommandScrape));
}

#[test]
fn test_no_backends_yields_sentinel() {
    let mut detector = Detector::new(Vec::new());

    let identity = detector.detect();

    assert_eq!(detector.state(), DetectorState::Failed);
    assert!(!identity.is_detected());
    assert_eq!(identity.name, "No GPU Detected");
    assert_eq!(identity.vendor, GpuVendor::Unknown);
    assert!(!identity.can_poll_live);
    assert!(detector.telemetry().snapshot().is_unknown());
}

#[test]
fn test_all_backends_failing_yields_sentinel() {
    let mut detector = Detector::new(vec![
        ScriptedBackend::unavailable(BackendKind::Nvml).boxed(),
        ScriptedBackend::unavailable(BackendKind::SmiQuery).boxed(),
    ]);

    let identity = detector.detect();

    assert_eq!(detector.state(), DetectorState::Failed);
    assert!(!identity.is_detected());
}

#[test]
fn test_identity_is_stable_across_calls() {
    let mut detector = Detector::new(vec![ScriptedBackend::available(
        BackendKind::SmiQuery,
        GpuVendor::Nvidia,
        "Tesla T4",
    )
    .boxed()]);

    let first = detector.detect();
    let second = detector.detect();

    assert_eq!(first, second);
    assert_eq!(*detector.identity(), *first);
}
