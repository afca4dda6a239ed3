//! Custom error types for linerev operations.

use thiserror::Error;

/// Result type alias for linerev operations
pub type Result<T> = std::result::Result<T, ReverseError>;

/// Error type for linerev operations.
///
/// Each variant maps to a distinct process exit code so that callers of the
/// binary can classify failures without parsing stderr: `1` I/O, `2`
/// malformed UTF-8, `3` line-budget or protocol violation, `4` usage.
#[derive(Error, Debug)]
pub enum ReverseError {
    /// Read, write, open, or close failure on the input or output file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line contained a byte sequence that is not valid UTF-8
    #[error("malformed UTF-8 at buffer offset {offset}")]
    MalformedUtf8 {
        /// Byte offset of the offending sequence within the processing buffer
        offset: usize,
    },

    /// A single line exceeded the supported length for the configured buffer
    #[error("line exceeds the maximum supported length for buffer size {buffer_size}")]
    LineTooLong {
        /// The configured read-buffer size in bytes
        buffer_size: usize,
    },

    /// The job-circulation protocol was violated (implementation bug, not user data)
    #[error("queue protocol violation: {detail}")]
    QueueProtocol {
        /// Description of the violated invariant
        detail: String,
    },

    /// Invalid command-line argument or unusable path
    #[error("invalid parameter '{parameter}': {reason}")]
    Usage {
        /// The parameter name
        parameter: String,
        /// Explanation of why it's invalid
        reason: String,
    },
}

impl ReverseError {
    /// The process exit code this error classifies as.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            ReverseError::Io(_) => 1,
            ReverseError::MalformedUtf8 { .. } => 2,
            ReverseError::LineTooLong { .. } | ReverseError::QueueProtocol { .. } => 3,
            ReverseError::Usage { .. } => 4,
        }
    }
}
