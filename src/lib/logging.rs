//! Logging utilities for formatted output.
//!
//! Consistent formatting helpers for byte counts, durations, and rates,
//! plus an operation timer for start/completion summary lines.

use std::time::{Duration, Instant};

/// Formats an integer with thousands separators.
///
/// # Examples
///
/// ```
/// use linerev_lib::logging::format_count;
///
/// assert_eq!(format_count(1234567), "1,234,567");
/// assert_eq!(format_count(42), "42");
/// ```
#[must_use]
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a byte count with binary units.
///
/// # Examples
///
/// ```
/// use linerev_lib::logging::format_bytes;
///
/// assert_eq!(format_bytes(512), "512 B");
/// assert_eq!(format_bytes(8192), "8.0 KiB");
/// assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Formats a duration in human-readable form.
///
/// # Examples
///
/// ```
/// use linerev_lib::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_secs(45)), "45s");
/// assert_eq!(format_duration(Duration::from_secs(135)), "2m 15s");
/// ```
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        return format!("{}ms", duration.as_millis());
    }
    if secs < 60 {
        return format!("{secs}s");
    }
    let mins = secs / 60;
    let remaining = secs % 60;
    if remaining == 0 { format!("{mins}m") } else { format!("{mins}m {remaining}s") }
}

/// Formats a throughput rate in bytes per second.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_rate(bytes: u64, duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        return format!("{}/s", format_bytes(bytes));
    }
    format!("{}/s", format_bytes((bytes as f64 / secs) as u64))
}

/// Operation timing and summary helper.
///
/// # Examples
///
/// ```no_run
/// use linerev_lib::logging::OperationTimer;
///
/// let timer = OperationTimer::new("Reversing lines");
/// // ... do work ...
/// timer.log_completion(1_000_000, 12345);
/// ```
pub struct OperationTimer {
    operation: String,
    start_time: Instant,
}

impl OperationTimer {
    /// Creates a new operation timer and logs the start.
    #[must_use]
    pub fn new(operation: &str) -> Self {
        log::info!("{operation} ...");
        Self { operation: operation.to_string(), start_time: Instant::now() }
    }

    /// Logs the completion with byte and line totals and throughput.
    pub fn log_completion(&self, bytes: u64, lines: u64) {
        let duration = self.start_time.elapsed();
        log::info!(
            "{} completed: {} lines, {} in {} ({})",
            self.operation,
            format_count(lines),
            format_bytes(bytes),
            format_duration(duration),
            format_rate(bytes, duration)
        );
    }
}
