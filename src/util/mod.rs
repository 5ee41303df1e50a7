//! Utility functions module
//!
//! Contains helpers for size conversions and throughput arithmetic.

pub mod units;

// Re-export commonly used functions
pub use units::{
    calculate_throughput_mbps, format_bytes, kib_to_bytes, mib_to_bytes,
    BYTES_PER_KIB, BYTES_PER_MIB,
};
