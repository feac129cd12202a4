use super::types::GpuVendor;

/// Substrings matched against the lowercased device name, first hit wins.
///
/// NVIDIA entries come first so names like "NVIDIA ... (AMD64 host)" never
/// fall through to AMD.
const VENDOR_PATTERNS: &[(&str, GpuVendor)] = &[
    ("nvidia", GpuVendor::Nvidia),
    ("geforce", GpuVendor::Nvidia),
    ("quadro", GpuVendor::Nvidia),
    ("radeon", GpuVendor::Amd),
    ("amd", GpuVendor::Amd),
    ("intel", GpuVendor::Intel),
];

/// Classify a free-text device name into a vendor.
///
/// Names that match nothing are `Generic`, never `Unknown`.
pub fn classify_vendor(name: &str) -> GpuVendor {
    let name = name.to_ascii_lowercase();

    VENDOR_PATTERNS
        .iter()
        .find(|(pattern, _)| name.contains(pattern))
        .map(|(_, vendor)| *vendor)
        .unwrap_or(GpuVendor::Generic)
}

/// Map a PCI vendor id (as read from sysfs, e.g. `0x10de`) to a vendor
pub fn vendor_from_pci_id(id: &str) -> Option<GpuVendor> {
    match id.trim().to_ascii_lowercase().as_str() {
        "0x10de" => Some(GpuVendor::Nvidia),
        "0x1002" => Some(GpuVendor::Amd),
        "0x8086" => Some(GpuVendor::Intel),
        _ => None,
    }
}
