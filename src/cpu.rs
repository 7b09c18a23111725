//! Current CPU identification.
//!
//! Event lists are published per CPU model and named after an id string of
//! the form `<vendor>-<family>-<MODEL>` with the model in uppercase hex, e.g.
//! `GenuineIntel-6-3C`. A few models ship separate lists per stepping and get
//! a `-<stepping>` suffix.

use crate::error::{Error, Result};

/// Models whose event lists differ between steppings.
const STEPPING_MODELS: &[u32] = &[0x55];

/// Vendor, family, model and stepping of a processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuId {
    pub vendor: String,
    pub family: u32,
    pub model: u32,
    pub stepping: Option<u32>,
}

impl CpuId {
    /// Identify the running CPU from `/proc/cpuinfo`.
    pub fn current() -> Result<Self> {
        let path = "/proc/cpuinfo";
        let content = std::fs::read_to_string(path).map_err(|e| Error::Read {
            path: path.into(),
            source: e,
        })?;
        Self::from_cpuinfo(&content)
    }

    /// Parse the first processor block of `/proc/cpuinfo` text.
    pub fn from_cpuinfo(content: &str) -> Result<Self> {
        let mut vendor = None;
        let mut family = None;
        let mut model = None;
        let mut stepping = None;

        for line in content.lines() {
            // Blank line ends the first processor block.
            if line.trim().is_empty() && vendor.is_some() {
                break;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "vendor_id" => vendor = Some(value.to_string()),
                "cpu family" => family = value.parse::<u32>().ok(),
                "model" => model = value.parse::<u32>().ok(),
                "stepping" => stepping = value.parse::<u32>().ok(),
                _ => {}
            }
        }

        match (vendor, family, model) {
            (Some(vendor), Some(family), Some(model)) => Ok(Self {
                vendor,
                family,
                model,
                stepping,
            }),
            _ => Err(Error::Cpu(
                "missing vendor_id, cpu family or model in cpuinfo".to_string(),
            )),
        }
    }

    /// Id string used to name event list files, e.g. `GenuineIntel-6-3C`.
    pub fn id_string(&self) -> String {
        let base = format!("{}-{}-{:X}", self.vendor, self.family, self.model);
        match self.stepping {
            Some(s) if STEPPING_MODELS.contains(&self.model) => format!("{base}-{s}"),
            _ => base,
        }
    }

    /// Id string with an event type suffix, e.g. `GenuineIntel-6-3C-core`.
    pub fn id_with_type(&self, event_type: &str) -> String {
        format!("{}-{event_type}", self.id_string())
    }
}
