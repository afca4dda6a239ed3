//! Command trait definition for CLI commands.
//!
//! This module defines the [`Command`] trait that all linerev CLI commands
//! implement. The trait uses `enum_dispatch` for efficient dynamic dispatch
//! across command variants.

use enum_dispatch::enum_dispatch;

/// Trait implemented by all linerev CLI commands.
///
/// Each command provides an `execute` method that runs the command's main
/// logic; the binary maps the returned error to a process exit code.
#[enum_dispatch]
pub trait Command {
    #[allow(clippy::missing_errors_doc)]
    fn execute(&self) -> anyhow::Result<()>;
}
