use gpuscope::core::gpu::{normalize, MemoryUnit, PowerUnit};
use gpuscope::{BackendKind, DeviceIdentity, GpuVendor, RawReading};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn identity() -> DeviceIdentity {
    DeviceIdentity::new(BackendKind::Nvml, GpuVendor::Nvidia, "Test GPU")
}

#[test]
fn test_bytes_and_mebibytes_agree() {
    let from_library = RawReading {
        vram_total: Some(8 * 1024 * 1024 * 1024),
        ..RawReading::new(MemoryUnit::Bytes, PowerUnit::Milliwatts)
    };
    let from_aggregator = RawReading {
        vram_total: Some(8192),
        ..RawReading::new(MemoryUnit::Mebibytes, PowerUnit::Watts)
    };

    assert_eq!(normalize(&from_library, &identity()).vram_total_mb, 8192);
    assert_eq!(normalize(&from_aggregator, &identity()).vram_total_mb, 8192);
}

#[test]
fn test_power_units_agree() {
    let milliwatts = RawReading {
        power: Some(75_500.0),
        ..RawReading::new(MemoryUnit::Bytes, PowerUnit::Milliwatts)
    };
    let microwatts = RawReading {
        power: Some(75_500_000.0),
        ..RawReading::new(MemoryUnit::Bytes, PowerUnit::Microwatts)
    };
    let watts = RawReading {
        power: Some(75.5),
        ..RawReading::new(MemoryUnit::Bytes, PowerUnit::Watts)
    };

    for reading in [milliwatts, microwatts, watts] {
        assert!((normalize(&reading, &identity()).power_draw_watts - 75.5).abs() < 0.001);
    }
}

#[test]
fn test_used_never_exceeds_total() {
    let mut rng = StdRng::seed_from_u64(0x6770_7573);

    for _ in 0..1000 {
        let unit = match rng.random_range(0..4) {
            0 => MemoryUnit::Bytes,
            1 => MemoryUnit::Kibibytes,
            2 => MemoryUnit::Mebibytes,
            _ => MemoryUnit::Gibibytes,
        };
        let total: u64 = rng.random_range(1..=(1u64 << 34));
        let used: u64 = rng.random_range(0..=(total * 2));

        let reading = RawReading {
            vram_used: Some(used),
            vram_total: Some(total),
            ..RawReading::new(unit, PowerUnit::Watts)
        };
        let snapshot = normalize(&reading, &identity());

        if snapshot.vram_total_mb > 0 {
            assert!(
                snapshot.vram_used_mb <= snapshot.vram_total_mb,
                "used {} > total {} for {:?}",
                snapshot.vram_used_mb,
                snapshot.vram_total_mb,
                reading
            );
        }
    }
}

#[test]
fn test_utilization_is_capped_and_rounded() {
    let over = RawReading {
        utilization: Some(140.0),
        ..RawReading::default()
    };
    let fractional = RawReading {
        utilization: Some(41.6),
        ..RawReading::default()
    };

    assert_eq!(normalize(&over, &identity()).utilization_percent, Some(100));
    assert_eq!(normalize(&fractional, &identity()).utilization_percent, Some(42));
}

#[test]
fn test_invalid_values_are_unknown() {
    let reading = RawReading {
        utilization: Some(f64::NAN),
        temperature: Some(-5.0),
        power: Some(f64::INFINITY),
        ..RawReading::default()
    };
    let snapshot = normalize(&reading, &identity());

    assert_eq!(snapshot.utilization_percent, None);
    assert_eq!(snapshot.temperature_celsius, None);
    assert_eq!(snapshot.power_draw_watts, 0.0);
}
