//! The pipeline's memory arena.
//!
//! Everything the pipeline touches at steady state lives in one contiguous,
//! cache-line-aligned allocation, carved into aligned strides and released
//! as a single deallocation when the arena drops:
//!
//! ```text
//! [ carry 0 | carry 1 | .. | carry backup | read 0 | read 1 | .. | q0 | q1 | q2 ]
//!   └── job_count + 1 slots of 2·B ──┘      └ job_count of B ┘    └ 3 × C ┘
//! ```
//!
//! Carry slots are twice the read-buffer size: a carry may hold a full
//! newline-less read (≤ B bytes) plus the terminating prefix of the next
//! read (≤ B bytes). The extra carry slot is the worker's private backup.
//! The queue region backs the slot arrays of the three SPSC rings.
//!
//! This is the only module in the crate with `unsafe` code: the carve hands
//! out non-overlapping slices of the single allocation, exactly once per
//! borrow of the arena.

use std::alloc::{Layout, alloc_zeroed, dealloc, handle_alloc_error};
use std::ptr::NonNull;
use std::sync::atomic::AtomicU8;

/// Alignment and stride quantum: the destructive-interference line size.
pub const CACHE_LINE: usize = 64;

/// Round `n` up to the next multiple of `align` (a power of two).
#[inline]
#[must_use]
pub fn round_up(n: usize, align: usize) -> usize {
    (n + align - 1) & !(align - 1)
}

/// One contiguous allocation backing buffers and ring slots.
pub struct Arena {
    ptr: NonNull<u8>,
    layout: Layout,
    buffer_size: usize,
    job_count: usize,
    queue_capacity: usize,
}

/// The carved regions, borrowed from the arena for the pipeline's lifetime.
pub struct Regions<'a> {
    /// Per-job carry slots (capacity `2 * buffer_size` each).
    pub carry_slots: Vec<&'a mut [u8]>,
    /// The worker's private carry backup (same capacity as a carry slot).
    pub backup_slot: &'a mut [u8],
    /// Per-job read slots (capacity `buffer_size` each).
    pub read_slots: Vec<&'a mut [u8]>,
    /// Slot storage for the three SPSC rings, `queue_capacity` each.
    pub ring_slots: [&'a [AtomicU8]; 3],
}

impl Arena {
    /// Allocate the arena for the given pipeline geometry.
    ///
    /// `job_count` is `(buffer_count - 1) / 2`; the caller validates the
    /// geometry before construction. Aborts on allocation failure, like any
    /// other failed Rust allocation.
    #[must_use]
    pub fn new(buffer_size: usize, job_count: usize, queue_capacity: usize) -> Self {
        assert!(buffer_size > 0 && job_count > 0 && queue_capacity > 0);
        let layout = Self::layout_for(buffer_size, job_count, queue_capacity);
        // SAFETY: `layout` has non-zero size and valid power-of-two alignment.
        let raw = unsafe { alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else { handle_alloc_error(layout) };
        Self { ptr, layout, buffer_size, job_count, queue_capacity }
    }

    fn carry_stride(buffer_size: usize) -> usize {
        round_up(2 * buffer_size, CACHE_LINE)
    }

    fn read_stride(buffer_size: usize) -> usize {
        round_up(buffer_size, CACHE_LINE)
    }

    fn queue_stride(queue_capacity: usize) -> usize {
        round_up(queue_capacity, CACHE_LINE)
    }

    fn layout_for(buffer_size: usize, job_count: usize, queue_capacity: usize) -> Layout {
        let total = (job_count + 1) * Self::carry_stride(buffer_size)
            + job_count * Self::read_stride(buffer_size)
            + 3 * Self::queue_stride(queue_capacity);
        Layout::from_size_align(total, CACHE_LINE).expect("arena layout overflow")
    }

    /// Total allocation size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    /// Carve the allocation into its regions.
    ///
    /// Takes `&mut self` so the regions' borrows are exclusive: a second
    /// carve is impossible while any slice from the first is alive.
    pub fn carve(&mut self) -> Regions<'_> {
        let carry_stride = Self::carry_stride(self.buffer_size);
        let read_stride = Self::read_stride(self.buffer_size);
        let queue_stride = Self::queue_stride(self.queue_capacity);
        let base = self.ptr.as_ptr();

        // Every slice below starts at a distinct cursor position and spans
        // at most its region stride, so the ranges are pairwise disjoint and
        // all lie inside the single allocation (the cursor ends exactly at
        // `layout.size()`). The memory is zero-initialized, `u8`/`AtomicU8`
        // demand no alignment beyond 1, and the returned lifetimes are tied
        // to the exclusive borrow of `self`, which ends before `Drop` can
        // deallocate.
        let mut offset = 0usize;

        let mut carry_slots = Vec::with_capacity(self.job_count);
        for _ in 0..self.job_count {
            // SAFETY: disjoint in-bounds range, see above.
            carry_slots
                .push(unsafe { std::slice::from_raw_parts_mut(base.add(offset), 2 * self.buffer_size) });
            offset += carry_stride;
        }
        // SAFETY: disjoint in-bounds range, see above.
        let backup_slot =
            unsafe { std::slice::from_raw_parts_mut(base.add(offset), 2 * self.buffer_size) };
        offset += carry_stride;

        let mut read_slots = Vec::with_capacity(self.job_count);
        for _ in 0..self.job_count {
            // SAFETY: disjoint in-bounds range, see above.
            read_slots
                .push(unsafe { std::slice::from_raw_parts_mut(base.add(offset), self.buffer_size) });
            offset += read_stride;
        }

        let mut ring_slots_vec = Vec::with_capacity(3);
        for _ in 0..3 {
            // SAFETY: disjoint in-bounds range, see above; zeroed bytes are
            // a valid initial state for `AtomicU8`.
            ring_slots_vec.push(unsafe {
                std::slice::from_raw_parts(base.add(offset).cast::<AtomicU8>(), self.queue_capacity)
            });
            offset += queue_stride;
        }
        let ring_slots: [&[AtomicU8]; 3] =
            ring_slots_vec.try_into().expect("exactly three ring regions");

        debug_assert_eq!(offset, self.layout.size());
        Regions { carry_slots, backup_slot, read_slots, ring_slots }
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        // SAFETY: `ptr` was produced by `alloc_zeroed` with this `layout`
        // and is deallocated exactly once.
        unsafe { dealloc(self.ptr.as_ptr(), self.layout) };
    }
}
