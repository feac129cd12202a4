//! Cross-platform aggregator backend built on the SMI query tool.
//!
//! Same query surface the usual GPU aggregator libraries scrape: one CSV row
//! per GPU, memory in MiB and power in watts. The vendor is classified from
//! the reported name rather than assumed.

use std::str::FromStr;

use crate::core::gpu::{
    classify_vendor, read_field, BackendKind, DeviceIdentity, GpuBackend, MemoryUnit, PowerUnit,
    RawReading,
};
use crate::error::{GpuError, Result};
use crate::platform::command::run_command;

const QUERY_FIELDS: &str = "--query-gpu=name,driver_version,memory.total,memory.used,\
utilization.gpu,temperature.gpu,clocks.current.graphics,clocks.current.memory,power.draw";
const FORMAT: &str = "--format=csv,noheader,nounits";

/// One parsed CSV row. Unsupported cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmiRow {
    pub name: String,
    pub driver_version: Option<String>,
    pub memory_total_mib: Option<u64>,
    pub memory_used_mib: Option<u64>,
    pub utilization_percent: Option<f64>,
    pub temperature_celsius: Option<f64>,
    pub core_clock_mhz: Option<u32>,
    pub memory_clock_mhz: Option<u32>,
    pub power_watts: Option<f64>,
}

/// Parse the first GPU row of the query output
pub fn parse_smi_csv(output: &str) -> Option<SmiRow> {
    let line = output.lines().map(str::trim).find(|line| !line.is_empty())?;
    let cells: Vec<&str> = line.split(',').map(str::trim).collect();

    let name = cells.first().filter(|n| !n.is_empty() && !is_unsupported(n))?;

    Some(SmiRow {
        name: name.to_string(),
        driver_version: cells
            .get(1)
            .filter(|v| !v.is_empty() && !is_unsupported(v))
            .map(|v| v.to_string()),
        memory_total_mib: cell(&cells, 2, "memory_total"),
        memory_used_mib: cell(&cells, 3, "vram_used"),
        utilization_percent: cell(&cells, 4, "utilization"),
        temperature_celsius: cell(&cells, 5, "temperature"),
        core_clock_mhz: cell(&cells, 6, "core_clock"),
        memory_clock_mhz: cell(&cells, 7, "memory_clock"),
        power_watts: cell(&cells, 8, "power"),
    })
}

fn is_unsupported(cell: &str) -> bool {
    let cell = cell.trim_matches(|c| c == '[' || c == ']');
    cell.eq_ignore_ascii_case("n/a") || cell.eq_ignore_ascii_case("not supported")
}

fn cell<T: FromStr>(cells: &[&str], index: usize, field: &'static str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let raw = cells.get(index).filter(|c| !c.is_empty() && !is_unsupported(c))?;
    read_field(field, raw.parse::<T>())
}

/// GPU backend using the SMI query tool's CSV output
pub struct SmiQueryBackend {
    command: String,
}

impl SmiQueryBackend {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn query(&self) -> Result<SmiRow> {
        let output = run_command(&self.command, &[QUERY_FIELDS, FORMAT])?;
        parse_smi_csv(&output).ok_or_else(|| {
            GpuError::unavailable(
                BackendKind::SmiQuery,
                format!("{} reported no GPUs", self.command),
            )
        })
    }
}

impl GpuBackend for SmiQueryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::SmiQuery
    }

    fn open(&mut self) -> Result<DeviceIdentity> {
        let row = self.query().map_err(|e| match e {
            GpuError::AdapterUnavailable { .. } => e,
            other => GpuError::unavailable(BackendKind::SmiQuery, other.to_string()),
        })?;

        let vendor = classify_vendor(&row.name);
        Ok(DeviceIdentity::new(BackendKind::SmiQuery, vendor, row.name)
            .with_memory(row.memory_total_mib.unwrap_or(0), MemoryUnit::Mebibytes)
            .with_driver(row.driver_version.unwrap_or_default()))
    }

    fn poll(&mut self) -> RawReading {
        let mut reading = RawReading::new(MemoryUnit::Mebibytes, PowerUnit::Watts);

        let Some(row) = read_field("smi query", self.query()) else {
            return reading;
        };

        reading.utilization = row.utilization_percent;
        reading.temperature = row.temperature_celsius;
        reading.vram_used = row.memory_used_mib;
        reading.vram_total = row.memory_total_mib;
        reading.core_clock_mhz = row.core_clock_mhz;
        reading.memory_clock_mhz = row.memory_clock_mhz;
        reading.power = row.power_watts;
        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_row() {
        let output = "NVIDIA GeForce RTX 3070, 550.54.14, 8192, 1234, 45, 63, 1905, 7000, 120.53\n";
        let row = parse_smi_csv(output).unwrap();

        assert_eq!(row.name, "NVIDIA GeForce RTX 3070");
        assert_eq!(row.driver_version.as_deref(), Some("550.54.14"));
        assert_eq!(row.memory_total_mib, Some(8192));
        assert_eq!(row.memory_used_mib, Some(1234));
        assert_eq!(row.utilization_percent, Some(45.0));
        assert_eq!(row.temperature_celsius, Some(63.0));
        assert_eq!(row.core_clock_mhz, Some(1905));
        assert_eq!(row.memory_clock_mhz, Some(7000));
        assert_eq!(row.power_watts, Some(120.53));
    }

    #[test]
    fn test_unsupported_cells_are_unknown() {
        let output = "Tesla T4, 535.00, 15360, 0, 0, 40, [N/A], [Not Supported], [N/A]";
        let row = parse_smi_csv(output).unwrap();

        assert_eq!(row.utilization_percent, Some(0.0));
        assert_eq!(row.core_clock_mhz, None);
        assert_eq!(row.memory_clock_mhz, None);
        assert_eq!(row.power_watts, None);
    }

    #[test]
    fn test_garbage_cell_only_loses_that_field() {
        let output = "Quadro P2000, 470.1, 5120, 100, busy, 50, 1000, 3500, 40.0";
        let row = parse_smi_csv(output).unwrap();

        assert_eq!(row.utilization_percent, None);
        assert_eq!(row.temperature_celsius, Some(50.0));
        assert_eq!(row.power_watts, Some(40.0));
    }

    #[test]
    fn test_only_first_gpu_is_used() {
        let output = "\nGPU A, 1, 1024, 1, 1, 1, 1, 1, 1\nGPU B, 2, 2048, 2, 2, 2, 2, 2, 2\n";
        assert_eq!(parse_smi_csv(output).unwrap().name, "GPU A");
    }

    #[test]
    fn test_empty_output_is_no_device() {
        assert_eq!(parse_smi_csv(""), None);
        assert_eq!(parse_smi_csv("\n  \n"), None);
    }

    #[test]
    fn test_missing_tool_probes_to_none() {
        let mut backend = SmiQueryBackend::new("gpuscope-missing-smi-tool");
        assert!(backend.probe().is_none());
    }
}
