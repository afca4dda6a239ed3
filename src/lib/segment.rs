//! Segments, jobs, and the shared job table.
//!
//! A [`Segment`] is a descriptor over a fixed-capacity arena buffer: the
//! valid bytes are `[off, off + len)` of the backing slice. Segments never
//! reallocate; only `len` and `off` change, and only under the stage that
//! currently owns the enclosing job.
//!
//! A [`Job`] is the unit of work circulating through the pipeline. By
//! convention `seg[0]` is the carry slot (a finished, already-reversed line
//! forwarded from the worker's carry buffer) and `seg[1]` is the read slot
//! (the tail of the just-processed buffer). The writer emits them in that
//! order, preserving input-line order.
//!
//! The [`JobTable`] is a fixed array of jobs shared by the three stages.
//! Queues move only `u8` indices; exclusive access to the indexed job is
//! asserted with a `try_lock` checkout. The locks are uncontended by
//! protocol (an index is owned by exactly one stage between its pop and its
//! push), so a failed `try_lock` is not a wait condition but a protocol
//! violation, surfaced as [`ReverseError::QueueProtocol`].

use parking_lot::{Mutex, MutexGuard};

use crate::errors::{ReverseError, Result};

/// A view over a fixed-capacity buffer slot owned by the arena.
#[derive(Debug)]
pub struct Segment<'a> {
    buf: &'a mut [u8],
    len: usize,
    off: usize,
}

impl<'a> Segment<'a> {
    /// Wrap a buffer slot as an empty segment.
    #[must_use]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0, off: 0 }
    }

    /// Fixed capacity of the backing buffer in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Count of valid bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no valid bytes are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset of the first valid byte. Meaningful only when non-empty.
    #[must_use]
    pub fn off(&self) -> usize {
        self.off
    }

    /// The valid byte range.
    #[must_use]
    pub fn valid(&self) -> &[u8] {
        &self.buf[self.off..self.off + self.len]
    }

    /// The valid byte range, mutably.
    pub fn valid_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.off..self.off + self.len]
    }

    /// The whole backing buffer, for the reader to fill from offset zero.
    pub fn backing_mut(&mut self) -> &mut [u8] {
        self.buf
    }

    /// Drop all valid bytes and reset the offset.
    pub fn clear(&mut self) {
        self.len = 0;
        self.off = 0;
    }

    /// Declare `len` bytes starting at offset zero as valid (after a read).
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the capacity.
    pub fn fill(&mut self, len: usize) {
        assert!(len <= self.buf.len(), "segment fill beyond capacity");
        self.off = 0;
        self.len = len;
    }

    /// Shrink the valid range to its first `new_len` bytes.
    pub fn truncate(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.len);
        self.len = new_len;
    }

    /// Advance past the first `n` valid bytes.
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.len);
        self.off += n;
        self.len -= n;
    }

    /// Append bytes to the end of the valid range.
    ///
    /// Only meaningful for carry segments, whose valid bytes always start at
    /// offset zero. Returns `false` without copying when the bytes do not
    /// fit, which the carry protocol reports as a line-budget violation.
    #[must_use]
    pub fn append(&mut self, bytes: &[u8]) -> bool {
        debug_assert_eq!(self.off, 0, "append requires an un-offset segment");
        let end = self.len + bytes.len();
        if end > self.buf.len() {
            return false;
        }
        self.buf[self.len..end].copy_from_slice(bytes);
        self.len = end;
        true
    }
}

/// A transferable unit of work: up to two segments plus an EOF marker.
///
/// The `eof` flag is set by the reader on the final (zero-length or failed)
/// read and is the only termination sentinel: a mid-file buffer without a
/// newline legitimately emits a zero-length read segment, so segment
/// emptiness alone cannot signal shutdown.
#[derive(Debug)]
pub struct Job<'a> {
    /// `seg[0]` carry slot, `seg[1]` read slot.
    pub seg: [Segment<'a>; 2],
    /// Number of segments the worker populated for emission (0, 1, or 2).
    pub seg_count: u8,
    /// Set on the job that carries the end-of-input signal downstream.
    pub eof: bool,
}

impl<'a> Job<'a> {
    /// Bind a carry slot and a read slot into an idle job.
    #[must_use]
    pub fn new(carry_slot: &'a mut [u8], read_slot: &'a mut [u8]) -> Self {
        Self { seg: [Segment::new(carry_slot), Segment::new(read_slot)], seg_count: 0, eof: false }
    }
}

/// Fixed table of jobs shared across the pipeline stages.
pub struct JobTable<'a> {
    jobs: Vec<Mutex<Job<'a>>>,
}

impl<'a> JobTable<'a> {
    /// Build the table from pre-bound jobs.
    #[must_use]
    pub fn new(jobs: Vec<Job<'a>>) -> Self {
        Self { jobs: jobs.into_iter().map(Mutex::new).collect() }
    }

    /// Number of jobs in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// True when the table holds no jobs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Check a job out for exclusive use by the current stage.
    ///
    /// # Errors
    ///
    /// Returns [`ReverseError::QueueProtocol`] when the index is out of range
    /// or the job is already checked out by another stage; both indicate a
    /// bug in index circulation, never a data problem.
    pub fn checkout(&self, index: u8) -> Result<MutexGuard<'_, Job<'a>>> {
        let slot = self.jobs.get(usize::from(index)).ok_or_else(|| {
            ReverseError::QueueProtocol { detail: format!("job index {index} out of range") }
        })?;
        slot.try_lock().ok_or_else(|| ReverseError::QueueProtocol {
            detail: format!("job {index} is checked out by another stage"),
        })
    }
}
