//! Input validation for pipeline configuration.
//!
//! Each command-line constraint is checked with a structured error naming
//! the parameter and the reason, so usage failures read the same everywhere.

use crate::errors::{ReverseError, Result};

/// Smallest accepted read-buffer size in bytes.
pub const MIN_BUFFER_SIZE: usize = 64;

/// Validate the read-buffer size.
///
/// The buffer size also bounds the longest supported line (content plus
/// terminator), so tiny buffers are rejected outright.
///
/// # Errors
///
/// Returns a usage error if the size is below [`MIN_BUFFER_SIZE`].
pub fn validate_buffer_size(buffer_size: usize) -> Result<()> {
    if buffer_size < MIN_BUFFER_SIZE {
        return Err(ReverseError::Usage {
            parameter: "buffer-size".to_string(),
            reason: format!("must be at least {MIN_BUFFER_SIZE} bytes, got {buffer_size}"),
        });
    }
    Ok(())
}

/// Validate the buffer count.
///
/// The count must be odd: buffers pair into (carry, read) job slots with one
/// left over as the worker's private carry backup. Job indices travel as
/// `u8`, which caps the count at 255.
///
/// # Errors
///
/// Returns a usage error if the count is even, below 3, or above 255.
pub fn validate_buffer_count(buffer_count: usize) -> Result<()> {
    if buffer_count < 3 || buffer_count % 2 == 0 || buffer_count > 255 {
        return Err(ReverseError::Usage {
            parameter: "buffer-count".to_string(),
            reason: format!("must be odd, between 3 and 255, got {buffer_count}"),
        });
    }
    Ok(())
}

/// Validate the SPSC queue capacity against the job count.
///
/// Capacity must be a power of two (the rings mask their indices) and large
/// enough that all job indices fit in one ring at once: a ring holds
/// `capacity - 1` items, and seeding pushes every index into the free queue.
///
/// # Errors
///
/// Returns a usage error if the capacity is not a power of two in
/// `[2, 256]`, or does not exceed `(buffer_count - 1) / 2`.
pub fn validate_queue_capacity(queue_capacity: usize, buffer_count: usize) -> Result<()> {
    if queue_capacity < 2 || queue_capacity > 256 || !queue_capacity.is_power_of_two() {
        return Err(ReverseError::Usage {
            parameter: "queue-capacity".to_string(),
            reason: format!("must be a power of two between 2 and 256, got {queue_capacity}"),
        });
    }
    let job_count = (buffer_count - 1) / 2;
    if queue_capacity <= job_count {
        return Err(ReverseError::Usage {
            parameter: "queue-capacity".to_string(),
            reason: format!(
                "must exceed the job count {job_count} implied by buffer-count {buffer_count}"
            ),
        });
    }
    Ok(())
}
