//! Benchmark engine module
//!
//! Contains the sequential write/read measurement routine.

pub mod sequential;

// Re-export commonly used types
pub use sequential::{
    CancelFlag, Clock, Phase, ProgressUpdate, SequentialBenchmark, SystemClock,
};
