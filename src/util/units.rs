//! Units formatting and conversion utilities
//!
//! Size conversions for the prompt values and the throughput
//! arithmetic shared by both benchmark phases.

use std::time::Duration;

/// Bytes per KB as entered at the prompt
pub const BYTES_PER_KIB: u64 = 1024;

/// Bytes per MB, both for the prompt and for reported throughput
pub const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Shortest elapsed time used as a divisor. A phase that completes
/// faster than the clock resolution is measured as taking this long.
pub const MIN_ELAPSED: Duration = Duration::from_micros(1);

/// Convert a KB count into bytes
pub fn kib_to_bytes(kib: u64) -> u64 {
    kib.saturating_mul(BYTES_PER_KIB)
}

/// Convert a MB count into bytes
pub fn mib_to_bytes(mib: u64) -> u64 {
    mib.saturating_mul(BYTES_PER_MIB)
}

/// Format bytes into human-readable size with appropriate units
///
/// # Examples
/// ```
/// use diskspeed::util::units::format_bytes;
///
/// assert_eq!(format_bytes(1024), "1.0 KiB");
/// assert_eq!(format_bytes(1048576), "1.0 MiB");
/// assert_eq!(format_bytes(1073741824), "1.0 GiB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Calculate throughput in MB/s from bytes and duration
///
/// Durations shorter than [`MIN_ELAPSED`] are clamped, so the result is
/// always finite and non-negative.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use diskspeed::util::units::calculate_throughput_mbps;
///
/// let throughput = calculate_throughput_mbps(1048576, Duration::from_secs(1));
/// assert!((throughput - 1.0).abs() < 0.01);
/// ```
pub fn calculate_throughput_mbps(bytes: u64, duration: Duration) -> f64 {
    let duration_secs = duration.max(MIN_ELAPSED).as_secs_f64();
    let megabytes = bytes as f64 / BYTES_PER_MIB as f64;
    megabytes / duration_secs
}
