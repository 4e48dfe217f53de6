//! JSON deserialization for benchmark result files.
//!
//! Parses the result documents written by the benchmark runner's JSON
//! reporter. Only the `benchmarks` array is consumed; the `context` block and
//! any per-record fields besides `name`, `real_time` and `time_unit` are
//! ignored.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Parsed contents of one benchmark result file.
#[derive(Debug, Clone, Deserialize)]
pub struct BenchResults {
    /// Individual benchmark records, in file order.
    pub benchmarks: Vec<BenchRecord>,
}

/// A single benchmark measurement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BenchRecord {
    /// Structured benchmark name, e.g. `simple_copy<8>/512`.
    pub name: String,
    /// Wall-clock time per iteration.
    pub real_time: f64,
    /// Unit of `real_time` (`ns`, `us`, `ms` or `s`), if reported.
    #[serde(default)]
    pub time_unit: Option<String>,
}

impl BenchRecord {
    /// Create a record with no time unit.
    pub fn new(name: impl Into<String>, real_time: f64) -> Self {
        Self {
            name: name.into(),
            real_time,
            time_unit: None,
        }
    }
}

/// Parse a benchmark result document held in memory.
pub fn parse_results(data: &[u8]) -> Result<BenchResults> {
    serde_json::from_slice(data).context("parsing benchmark results JSON")
}

/// Read and parse a benchmark result file.
///
/// The file is read completely and closed before parsing.
pub fn load_results(path: &Path) -> Result<BenchResults> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let results = serde_json::from_slice(&data)
        .with_context(|| format!("parsing benchmark results in {}", path.display()))?;
    Ok(results)
}
