//! CPU affinity for the pipeline stage threads.
//!
//! Pinning each stage to its own core keeps the SPSC hot paths on stable
//! cache lines. This is a performance lever, not a correctness requirement:
//! failures are logged at debug level and otherwise ignored, and platforms
//! without an affinity API get a no-op.

/// Pin the calling thread to `core` (zero-based).
#[cfg(target_os = "linux")]
pub fn pin_current_thread(core: usize) {
    // SAFETY: `cpu_set_t` is a plain bitmask struct; zeroed is its empty
    // state, and the syscall only reads the mask we pass.
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(core, &mut set);
        let rc = libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set);
        if rc != 0 {
            log::debug!("failed to pin thread to core {core}: {}", std::io::Error::last_os_error());
        }
    }
}

/// Pin the calling thread to `core` (no-op on this platform).
#[cfg(not(target_os = "linux"))]
pub fn pin_current_thread(core: usize) {
    let _ = core;
}
