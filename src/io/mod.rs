//! I/O operations module
//!
//! Owns the benchmark file: creation, chunked access and cleanup.

pub mod disk;

pub use disk::{clear, TargetFile};
