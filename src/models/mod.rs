//! Data models module
//!
//! Contains the per-phase results and the final benchmark report.

pub mod result;

// Re-export commonly used types
pub use result::{BenchmarkReport, PhaseResult};
