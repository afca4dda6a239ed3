//! Version string for log and `--version` output.

/// Version of the software from the Cargo package metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
