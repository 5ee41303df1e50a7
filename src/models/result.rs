//! Benchmark result data models
//!
//! Per-phase timing results and the report printed at the end of a run.

use crate::util::units::calculate_throughput_mbps;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Width of the `=` rule framing the report
pub const REPORT_RULE_WIDTH: usize = 50;

/// Timing result of one phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    /// Wall-clock time of the phase
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
    /// Throughput in MB/s (1 MB = 1,048,576 bytes)
    pub throughput_mbps: f64,
}

impl PhaseResult {
    /// Derive the result of a phase that moved `bytes` in `elapsed`
    pub fn new(bytes: u64, elapsed: Duration) -> Self {
        Self {
            elapsed,
            throughput_mbps: calculate_throughput_mbps(bytes, elapsed),
        }
    }

    /// Elapsed time in seconds
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Complete result of one benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Local time the run started
    pub started_at: DateTime<Local>,
    /// Bytes per write/read operation
    pub chunk_size: u64,
    /// Bytes written and read back
    pub file_size: u64,
    /// Location of the benchmark file
    pub target_path: PathBuf,
    /// Write phase result
    pub write: PhaseResult,
    /// Read phase result
    pub read: PhaseResult,
}

impl BenchmarkReport {
    /// Render the report as pretty JSON
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(REPORT_RULE_WIDTH);
        writeln!(f, "{}", rule)?;
        writeln!(f, "Reading Time:  {:>10.2} seconds", self.read.seconds())?;
        writeln!(f, "Reading Speed: ~{:>9.2} MB/s", self.read.throughput_mbps)?;
        writeln!(f, "Writing Time:  {:>10.2} seconds", self.write.seconds())?;
        writeln!(f, "Writing Speed: ~{:>9.2} MB/s", self.write.throughput_mbps)?;
        write!(f, "{}", rule)
    }
}

/// Durations serialized as fractional seconds
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom("duration must be non-negative"));
        }
        Ok(Duration::from_secs_f64(secs))
    }
}
