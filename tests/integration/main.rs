//! Integration tests for the linerev library.
//!
//! These tests validate end-to-end workflows that span multiple modules,
//! driving the full pipeline over real files and in-memory streams.

mod test_error_paths;
mod test_reverse_command;
mod test_verify_command;
