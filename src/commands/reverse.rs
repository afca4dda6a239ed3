//! The `reverse` command: run the streaming pipeline over a file pair.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use linerev_lib::ReverseError;
use linerev_lib::logging::OperationTimer;
use linerev_lib::pipeline::{PipelineConfig, reverse_file};

use crate::commands::command::Command;

/// Reverse each line of a UTF-8 text file, preserving `\n` and `\r\n`
/// terminators exactly.
///
/// Lines are reversed at code-point granularity: a multi-byte code point
/// stays intact, only its position within the line changes. The output file
/// has byte-for-byte identical line count and terminator placement.
#[derive(Parser, Debug)]
pub struct Reverse {
    /// Input text file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (created or truncated)
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Read-buffer size in bytes; bounds the longest supported line
    #[arg(short = 'b', long = "buffer-size", default_value = "8192")]
    pub buffer_size: usize,

    /// Number of arena buffer slots (odd); controls pipeline depth
    #[arg(short = 'c', long = "buffer-count", default_value = "9")]
    pub buffer_count: usize,

    /// Capacity of each stage queue (power of two)
    #[arg(short = 'q', long = "queue-capacity", default_value = "16")]
    pub queue_capacity: usize,

    /// Pin the reader, worker, and writer threads to cores 0-2
    #[arg(long = "pin-threads")]
    pub pin_threads: bool,
}

impl Reverse {
    fn config(&self) -> PipelineConfig {
        PipelineConfig {
            buffer_size: self.buffer_size,
            buffer_count: self.buffer_count,
            queue_capacity: self.queue_capacity,
            pin_threads: self.pin_threads,
        }
    }
}

impl Command for Reverse {
    fn execute(&self) -> Result<()> {
        if !self.input.exists() {
            return Err(ReverseError::Usage {
                parameter: "INPUT".to_string(),
                reason: format!("file does not exist: {}", self.input.display()),
            }
            .into());
        }

        let config = self.config();
        let timer = OperationTimer::new("Reversing lines");
        let summary = reverse_file(&self.input, &self.output, &config)?;
        timer.log_completion(summary.bytes_written, summary.lines_reversed);
        Ok(())
    }
}
