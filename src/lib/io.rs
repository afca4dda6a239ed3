//! Thin I/O adapter around the input and output files.
//!
//! The pipeline treats I/O as an opaque collaborator: the reader performs
//! exactly one `read` syscall per buffer, the writer emits a job's segments
//! with a single plain or vectored write, retrying and repacking partial
//! completions internally. The stage loops are generic over `Read`/`Write`
//! so tests can drive them against in-memory buffers.

use std::fs::{File, OpenOptions};
use std::io::{self, IoSlice, Read, Write};
use std::path::Path;

/// Open the input file for reading.
///
/// # Errors
///
/// Propagates the underlying open failure.
pub fn open_read(path: &Path) -> io::Result<File> {
    File::open(path)
}

/// Create or truncate the output file (mode `0644` on Unix).
///
/// # Errors
///
/// Propagates the underlying open failure.
pub fn open_write(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    options.open(path)
}

/// Read once into `buf`, retrying only on `Interrupted`.
///
/// Returns `0` at end of file. Short reads are not retried: a short read on
/// a regular file means the remaining bytes end before the buffer does, and
/// the pipeline's carry protocol relies on that distinction.
///
/// # Errors
///
/// Propagates the underlying read failure.
pub fn read_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

/// Write a job's segments: one plain write for a single segment, one
/// vectored write for two, nothing for none.
///
/// # Errors
///
/// Propagates the underlying write failure; a writer that cannot make
/// progress surfaces as `WriteZero`.
pub fn write_segments<W: Write>(
    writer: &mut W,
    first: Option<&[u8]>,
    second: Option<&[u8]>,
) -> io::Result<()> {
    match (first, second) {
        (Some(a), Some(b)) => {
            let mut slices = [IoSlice::new(a), IoSlice::new(b)];
            write_all_vectored(writer, &mut slices)
        }
        (Some(a), None) => writer.write_all(a),
        (None, Some(b)) => writer.write_all(b),
        (None, None) => Ok(()),
    }
}

/// Drive `write_vectored` to completion, repacking the slice array after
/// partial writes.
fn write_all_vectored<W: Write>(writer: &mut W, mut bufs: &mut [IoSlice<'_>]) -> io::Result<()> {
    let mut remaining: usize = bufs.iter().map(|b| b.len()).sum();
    while remaining > 0 {
        match writer.write_vectored(bufs) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write segment bytes",
                ));
            }
            Ok(n) => {
                remaining -= n;
                IoSlice::advance_slices(&mut bufs, n);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
