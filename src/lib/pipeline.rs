//! The three-stage streaming pipeline.
//!
//! # Architecture
//!
//! ```text
//! Reader ── q_ready_to_work ──▶ Worker ── q_ready_to_write ──▶ Writer
//!    ▲                                                            │
//!    └───────────────── q_free_to_read ◀─────────────────────────┘
//! ```
//!
//! Three dedicated threads, one per stage, communicate through three SPSC
//! rings carrying `u8` job indices. Buffers never move and are never copied
//! between stages; ownership of a job (and the two arena buffers bound to
//! it) transfers with its index. Each stage blocks only at its input queue
//! edge; reads and writes are plain blocking syscalls.
//!
//! A job cycles `FREE → READ_FILLED → WORK_DONE → EMITTED → FREE`, one queue
//! hop per transition. Termination is EOF-driven: the reader flags the job
//! produced by the zero-length read, and the flag rides the ring to the
//! worker (which drains its carry) and the writer (which exits without
//! recycling the final index). Fatal errors raise a shared stop flag
//! instead; queues drain what was already emitted and every stage unblocks
//! on its next wait or push.

use std::io::{Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::affinity::pin_current_thread;
use crate::arena::Arena;
use crate::carry::CarryState;
use crate::errors::{ReverseError, Result};
use crate::io;
use crate::ring::JobQueue;
use crate::segment::{Job, JobTable};
use crate::validation::{validate_buffer_count, validate_buffer_size, validate_queue_capacity};

/// Tuning knobs for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Read-buffer size B in bytes; also bounds the longest supported line.
    pub buffer_size: usize,
    /// Total arena buffer slots (odd): pairs into jobs plus the worker's
    /// private carry backup. Controls pipeline depth.
    pub buffer_count: usize,
    /// SPSC ring capacity (power of two).
    pub queue_capacity: usize,
    /// Pin the three stage threads to cores 0, 1, and 2.
    pub pin_threads: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { buffer_size: 8192, buffer_count: 9, queue_capacity: 16, pin_threads: false }
    }
}

impl PipelineConfig {
    /// Check every configuration constraint.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint as a usage error.
    pub fn validate(&self) -> Result<()> {
        validate_buffer_size(self.buffer_size)?;
        validate_buffer_count(self.buffer_count)?;
        validate_queue_capacity(self.queue_capacity, self.buffer_count)?;
        Ok(())
    }

    /// Number of jobs in the table: `(buffer_count - 1) / 2`.
    #[must_use]
    pub fn job_count(&self) -> usize {
        (self.buffer_count - 1) / 2
    }
}

/// Totals reported by a completed run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineSummary {
    /// Bytes consumed from the input.
    pub bytes_read: u64,
    /// Bytes emitted to the output (equal to `bytes_read` on success).
    pub bytes_written: u64,
    /// Completed line reversals, counting an unterminated final line.
    pub lines_reversed: u64,
}

/// State shared by the three stages: the stop flag, the first error, and
/// run counters.
struct Shared {
    stop: AtomicBool,
    error: Mutex<Option<ReverseError>>,
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
    lines_reversed: AtomicU64,
}

impl Shared {
    fn new() -> Self {
        Self {
            stop: AtomicBool::new(false),
            error: Mutex::new(None),
            bytes_read: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            lines_reversed: AtomicU64::new(0),
        }
    }

    /// Record an error and signal the stages to stop. The first error wins.
    fn set_error(&self, error: ReverseError) {
        self.stop.store(true, Ordering::SeqCst);
        let mut guard = self.error.lock();
        if guard.is_none() {
            *guard = Some(error);
        }
    }

    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    fn take_error(&self) -> Option<ReverseError> {
        self.error.lock().take()
    }
}

/// Reverse `input` into `output` using the configured pipeline.
///
/// # Errors
///
/// Opening either path, or any pipeline failure, as [`ReverseError`].
pub fn reverse_file(input: &Path, output: &Path, config: &PipelineConfig) -> Result<PipelineSummary> {
    // Validate before touching the filesystem so a usage error never
    // truncates an existing output file.
    config.validate()?;
    let input_file = io::open_read(input)?;
    let output_file = io::open_write(output)?;
    run_with(input_file, output_file, config)
}

/// Run the pipeline over any reader/writer pair.
///
/// Generic so tests can drive in-memory inputs; the binary passes files.
///
/// # Errors
///
/// The first error any stage recorded: I/O, malformed UTF-8, line budget,
/// or queue protocol. The configuration is validated first.
pub fn run_with<R, W>(input: R, output: W, config: &PipelineConfig) -> Result<PipelineSummary>
where
    R: Read + Send,
    W: Write + Send,
{
    config.validate()?;
    let job_count = config.job_count();

    let mut arena = Arena::new(config.buffer_size, job_count, config.queue_capacity);
    log::debug!(
        "pipeline: {} jobs, {} byte buffers, queue capacity {}, {} byte arena",
        job_count,
        config.buffer_size,
        config.queue_capacity,
        arena.size()
    );
    let regions = arena.carve();

    let q_free = JobQueue::new(regions.ring_slots[0]);
    let q_work = JobQueue::new(regions.ring_slots[1]);
    let q_write = JobQueue::new(regions.ring_slots[2]);

    let mut jobs = Vec::with_capacity(job_count);
    for (carry_slot, read_slot) in regions.carry_slots.into_iter().zip(regions.read_slots) {
        jobs.push(Job::new(carry_slot, read_slot));
    }
    let table = JobTable::new(jobs);
    let carry = CarryState::new(regions.backup_slot, config.buffer_size);

    for index in 0..job_count {
        q_free.try_push(index as u8).map_err(|_| ReverseError::QueueProtocol {
            detail: format!("free queue refused seed index {index}"),
        })?;
    }

    let shared = Shared::new();
    let pin = config.pin_threads;

    std::thread::scope(|scope| {
        let shared = &shared;
        let table = &table;
        let (q_free, q_work, q_write) = (&q_free, &q_work, &q_write);

        let reader = scope.spawn(move || {
            if pin {
                pin_current_thread(0);
            }
            reader_stage(input, shared, table, q_free, q_work);
        });
        let worker = scope.spawn(move || {
            if pin {
                pin_current_thread(1);
            }
            worker_stage(carry, shared, table, q_work, q_write);
        });
        let writer = scope.spawn(move || {
            if pin {
                pin_current_thread(2);
            }
            writer_stage(output, shared, table, q_write, q_free);
        });

        for handle in [reader, worker, writer] {
            if handle.join().is_err() {
                shared.set_error(ReverseError::QueueProtocol {
                    detail: "pipeline stage panicked".to_string(),
                });
            }
        }
    });

    if let Some(error) = shared.take_error() {
        return Err(error);
    }
    Ok(PipelineSummary {
        bytes_read: shared.bytes_read.load(Ordering::Relaxed),
        bytes_written: shared.bytes_written.load(Ordering::Relaxed),
        lines_reversed: shared.lines_reversed.load(Ordering::Relaxed),
    })
}

/// Reader: fill read segments one blocking `read` at a time.
fn reader_stage<R: Read>(
    mut input: R,
    shared: &Shared,
    table: &JobTable<'_>,
    q_free: &JobQueue<'_>,
    q_work: &JobQueue<'_>,
) {
    loop {
        let Some(index) = q_free.pop_blocking(&shared.stop) else { break };
        if shared.should_stop() {
            break;
        }

        let mut done = false;
        match table.checkout(index) {
            Ok(mut job) => {
                job.seg_count = 0;
                job.eof = false;
                let read_slot = &mut job.seg[1];
                debug_assert!(read_slot.is_empty(), "recycled read slot must be empty");
                match io::read_block(&mut input, read_slot.backing_mut()) {
                    Ok(n) => {
                        read_slot.fill(n);
                        job.eof = n == 0;
                        shared.bytes_read.fetch_add(n as u64, Ordering::Relaxed);
                        done = job.eof;
                    }
                    Err(e) => {
                        read_slot.clear();
                        job.eof = true;
                        shared.set_error(ReverseError::Io(e));
                        done = true;
                    }
                }
            }
            Err(e) => {
                shared.set_error(e);
                done = true;
            }
        }

        if !q_work.push_blocking(index, &shared.stop) || done {
            break;
        }
    }
    q_work.notify_all();
}

/// Worker: run the carry protocol over each filled job.
fn worker_stage<'a>(
    mut carry: CarryState<'a>,
    shared: &Shared,
    table: &JobTable<'a>,
    q_work: &JobQueue<'_>,
    q_write: &JobQueue<'_>,
) {
    loop {
        let Some(index) = q_work.pop_blocking(&shared.stop) else { break };

        let mut done = false;
        match table.checkout(index) {
            Ok(mut job) => {
                if let Err(e) = carry.process_job(&mut job) {
                    // Drop this job's content; the writer drains only what
                    // was queued before the failure.
                    job.seg[0].clear();
                    job.seg[1].clear();
                    job.seg_count = 0;
                    job.eof = true;
                    shared.set_error(e);
                }
                done = job.eof;
            }
            Err(e) => {
                shared.set_error(e);
                done = true;
            }
        }

        if !q_write.push_blocking(index, &shared.stop) || done {
            break;
        }
    }
    shared.lines_reversed.store(carry.lines_reversed(), Ordering::Relaxed);
    q_write.notify_all();
}

/// Writer: emit each job's segments in order and recycle the index.
fn writer_stage<W: Write>(
    mut output: W,
    shared: &Shared,
    table: &JobTable<'_>,
    q_write: &JobQueue<'_>,
    q_free: &JobQueue<'_>,
) {
    loop {
        let Some(index) = q_write.pop_blocking(&shared.stop) else { break };

        let mut done = false;
        match table.checkout(index) {
            Ok(mut job) => {
                let [carry_seg, read_seg] = &job.seg;
                let first = (!carry_seg.is_empty()).then(|| carry_seg.valid());
                let second = (!read_seg.is_empty()).then(|| read_seg.valid());
                let bytes = (carry_seg.len() + read_seg.len()) as u64;

                match io::write_segments(&mut output, first, second) {
                    Ok(()) => {
                        shared.bytes_written.fetch_add(bytes, Ordering::Relaxed);
                    }
                    Err(e) => {
                        shared.set_error(ReverseError::Io(e));
                        done = true;
                    }
                }

                job.seg[0].clear();
                job.seg[1].clear();
                job.seg_count = 0;
                done |= job.eof;
            }
            Err(e) => {
                shared.set_error(e);
                done = true;
            }
        }

        if done {
            break;
        }
        if !q_free.push_blocking(index, &shared.stop) {
            break;
        }
    }
    if let Err(e) = output.flush() {
        shared.set_error(ReverseError::Io(e));
    }
    q_free.notify_all();
}
