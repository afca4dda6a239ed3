//! Single-producer/single-consumer lock-free rings for job indices.
//!
//! [`SpscRing`] is the bare ring: fixed power-of-two capacity, `u8` payload,
//! slot storage provided by the caller (carved from the arena), and two
//! monotonic masked indices, each padded to its own cache line so the
//! producer and consumer never share one.
//!
//! The payload store uses a relaxed atomic write ordered by the release
//! store of `tail`, which synchronizes-with the consumer's acquire load;
//! `head` is symmetric for slot reuse. With exactly one producer and one
//! consumer this is the full correctness argument.
//!
//! [`JobQueue`] pairs a ring with a mutex + condvar used only for wake-ups
//! when a stage observes empty (or full) and must wait. The hot path never
//! takes the mutex. Waits are timed: the edge-notification scheme has a
//! benign race (a notify can land between a stage's emptiness check and its
//! wait), and the bounded wait turns a lost wake-up into at most one wait
//! interval of latency. Every wait predicate also observes the pipeline
//! stop flag so stages unblock promptly on shutdown.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::time::Duration;

use crossbeam_utils::CachePadded;
use parking_lot::{Condvar, Mutex};

/// Upper bound on the wait between re-checks while blocked on a queue edge.
const WAKE_INTERVAL: Duration = Duration::from_millis(1);

/// Lock-free SPSC ring over caller-provided slot storage.
pub struct SpscRing<'a> {
    slots: &'a [AtomicU8],
    mask: usize,
    head: CachePadded<AtomicUsize>,
    tail: CachePadded<AtomicUsize>,
}

impl<'a> SpscRing<'a> {
    /// Wrap a slot array as an empty ring.
    ///
    /// Usable capacity is `slots.len() - 1`: one slot stays vacant to
    /// distinguish full from empty.
    ///
    /// # Panics
    ///
    /// Panics unless `slots.len()` is a power of two and at least 2; the
    /// pipeline validates queue capacity before the arena is carved.
    #[must_use]
    pub fn new(slots: &'a [AtomicU8]) -> Self {
        let cap = slots.len();
        assert!(cap >= 2 && cap.is_power_of_two(), "ring capacity must be a power of two >= 2");
        Self {
            slots,
            mask: cap - 1,
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    /// Attempt to enqueue; returns the value back when the ring is full.
    ///
    /// Producer-side only.
    pub fn push(&self, value: u8) -> std::result::Result<(), u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        let tail_next = (tail + 1) & self.mask;
        if tail_next == self.head.load(Ordering::Acquire) {
            return Err(value);
        }
        self.slots[tail].store(value, Ordering::Relaxed);
        self.tail.store(tail_next, Ordering::Release);
        Ok(())
    }

    /// Attempt to dequeue; `None` when the ring is empty.
    ///
    /// Consumer-side only.
    pub fn pop(&self) -> Option<u8> {
        let head = self.head.load(Ordering::Relaxed);
        if head == self.tail.load(Ordering::Acquire) {
            return None;
        }
        let value = self.slots[head].load(Ordering::Relaxed);
        self.head.store((head + 1) & self.mask, Ordering::Release);
        Some(value)
    }

    /// Number of enqueued items.
    #[must_use]
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head) & self.mask
    }

    /// True when nothing is enqueued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when a push would be refused.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.mask
    }
}

/// An SPSC ring with blocking edges for the pipeline stages.
pub struct JobQueue<'a> {
    ring: SpscRing<'a>,
    gate: Mutex<()>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<'a> JobQueue<'a> {
    /// Wrap a slot array as an empty blocking queue.
    #[must_use]
    pub fn new(slots: &'a [AtomicU8]) -> Self {
        Self {
            ring: SpscRing::new(slots),
            gate: Mutex::new(()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Non-blocking enqueue, used for seeding before the stages start.
    pub fn try_push(&self, value: u8) -> std::result::Result<(), u8> {
        self.ring.push(value)
    }

    /// Current queue depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// True when nothing is enqueued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Enqueue, waiting while the ring is full.
    ///
    /// Returns `false` when `stop` was raised before the value could be
    /// enqueued; the caller abandons its loop.
    pub fn push_blocking(&self, value: u8, stop: &AtomicBool) -> bool {
        loop {
            let was_empty = self.ring.is_empty();
            match self.ring.push(value) {
                Ok(()) => {
                    if was_empty {
                        self.not_empty.notify_one();
                    }
                    return true;
                }
                Err(_) => {
                    if stop.load(Ordering::Relaxed) {
                        return false;
                    }
                    let mut guard = self.gate.lock();
                    if self.ring.is_full() && !stop.load(Ordering::Relaxed) {
                        self.not_full.wait_for(&mut guard, WAKE_INTERVAL);
                    }
                }
            }
        }
    }

    /// Dequeue, waiting while the ring is empty.
    ///
    /// Returns `None` when `stop` was raised while the queue stayed empty.
    pub fn pop_blocking(&self, stop: &AtomicBool) -> Option<u8> {
        loop {
            let was_full = self.ring.is_full();
            if let Some(value) = self.ring.pop() {
                if was_full {
                    self.not_full.notify_one();
                }
                return Some(value);
            }
            if stop.load(Ordering::Relaxed) {
                return None;
            }
            let mut guard = self.gate.lock();
            if self.ring.is_empty() && !stop.load(Ordering::Relaxed) {
                self.not_empty.wait_for(&mut guard, WAKE_INTERVAL);
            }
        }
    }

    /// Wake any stage parked on this queue (used when raising the stop flag).
    pub fn notify_all(&self) {
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }
}
