//! The `verify` command: check that an output file is the correct
//! line-by-line reversal of an input file.
//!
//! The check re-derives the expected output independently of the pipeline:
//! each input line's content (terminator stripped) is reversed by code
//! points and compared byte-for-byte against the corresponding output line.
//! The first mismatch is reported with its line number and a context
//! preview.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use log::info;

use linerev_lib::io::open_read;

use crate::commands::command::Command;

/// Verify that OUTPUT contains the line-by-line reversal of INPUT.
///
/// Exits zero when every output line is the code-point reversal of the
/// corresponding input line with its terminator preserved, non-zero with a
/// diagnostic otherwise.
#[derive(Parser, Debug)]
pub struct Verify {
    /// The original input file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// The reversed output file to check
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Preview width around a mismatch, in characters
    #[arg(long = "context", default_value = "40")]
    pub context: usize,
}

impl Command for Verify {
    fn execute(&self) -> Result<()> {
        let mut input = BufReader::new(open_read(&self.input)?);
        let mut output = BufReader::new(open_read(&self.output)?);

        let mut line_number = 0u64;
        loop {
            let in_line = read_line_bytes(&mut input)?;
            let out_line = read_line_bytes(&mut output)?;
            line_number += 1;

            match (in_line, out_line) {
                (None, None) => {
                    info!("verified {} lines: output matches", line_number - 1);
                    return Ok(());
                }
                (Some(_), None) => {
                    bail!("output ends early: no line {line_number} in {}", self.output.display())
                }
                (None, Some(extra)) => {
                    bail!(
                        "output has extra content at line {line_number}: {}",
                        preview(&extra, 0, self.context)
                    )
                }
                (Some(in_bytes), Some(out_bytes)) => {
                    let expected = reverse_line_bytes(&in_bytes);
                    if expected != out_bytes {
                        let at = first_mismatch(&expected, &out_bytes);
                        bail!(
                            "mismatch at line {line_number}, byte {at}:\n  expected: {}\n  found:    {}",
                            preview(&expected, at, self.context),
                            preview(&out_bytes, at, self.context)
                        );
                    }
                }
            }
        }
    }
}

/// Read one line including its terminator; `None` at EOF.
fn read_line_bytes(reader: &mut BufReader<File>) -> Result<Option<Vec<u8>>> {
    let mut line = Vec::new();
    let n = reader.read_until(b'\n', &mut line)?;
    if n == 0 { Ok(None) } else { Ok(Some(line)) }
}

/// Reverse a line's content by code points, preserving the terminator.
///
/// Content that is not valid UTF-8 falls back to raw byte reversal so the
/// diagnostic still points at the right line.
fn reverse_line_bytes(line: &[u8]) -> Vec<u8> {
    let (content, eol): (&[u8], &[u8]) = if line.ends_with(b"\r\n") {
        (&line[..line.len() - 2], b"\r\n")
    } else if line.ends_with(b"\n") {
        (&line[..line.len() - 1], b"\n")
    } else {
        (line, b"")
    };

    let mut reversed = match std::str::from_utf8(content) {
        Ok(s) => s.chars().rev().collect::<String>().into_bytes(),
        Err(_) => content.iter().rev().copied().collect(),
    };
    reversed.extend_from_slice(eol);
    reversed
}

/// Index of the first differing byte, or the shorter length.
fn first_mismatch(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).position(|(x, y)| x != y).unwrap_or_else(|| a.len().min(b.len()))
}

/// A printable window of `bytes` around position `at`.
fn preview(bytes: &[u8], at: usize, width: usize) -> String {
    let lo = at.saturating_sub(width);
    let hi = (at + width).min(bytes.len());
    String::from_utf8_lossy(&bytes[lo..hi]).replace('\n', "\\n").replace('\r', "\\r")
}
