//! Error path integration tests.
//!
//! These tests verify that failure conditions are classified correctly:
//! malformed UTF-8, blown line budgets, bad configuration, and unusable
//! paths each surface as their own error kind and exit code.

use crate::helpers::{missing_path, reverse_bytes, reverse_bytes_with, small_buffer_config, temp_input};
use linerev_lib::ReverseError;
use linerev_lib::pipeline::{PipelineConfig, reverse_file};

#[test]
fn test_malformed_utf8_classified_as_exit_2() {
    let err = reverse_bytes(&[b'o', b'k', b'\n', b'a', 0xFF, b'b', b'\n']).unwrap_err();
    assert!(matches!(err, ReverseError::MalformedUtf8 { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_truncated_sequence_mid_line_detected() {
    // C3 starts a two-byte sequence but is followed by ASCII.
    let err = reverse_bytes(&[b'a', 0xC3, b'b', b'\n']).unwrap_err();
    assert!(matches!(err, ReverseError::MalformedUtf8 { .. }));
}

#[test]
fn test_malformed_detected_when_split_across_buffers() {
    // The bad byte sits in a line that spans two 64-byte reads.
    let mut input = vec![b'x'; 60];
    input.push(0x80);
    input.extend_from_slice(b"tail\n");
    let err = reverse_bytes_with(&input, &small_buffer_config(64)).unwrap_err();
    assert!(matches!(err, ReverseError::MalformedUtf8 { .. }));
}

#[test]
fn test_line_exceeding_budget_classified_as_exit_3() {
    let input = vec![b'z'; 4 * 64];
    let err = reverse_bytes_with(&input, &small_buffer_config(64)).unwrap_err();
    assert!(matches!(err, ReverseError::LineTooLong { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_valid_lines_before_failure_already_on_disk() {
    // The pipeline does not truncate partial output on failure; callers
    // must check the exit code before trusting the file.
    let mut input = b"good\n".to_vec();
    input.extend_from_slice(&[0xFF, b'\n']);

    let input_file = temp_input(&input);
    let out_dir = tempfile::TempDir::new().unwrap();
    let out_path = out_dir.path().join("partial.txt");
    let err =
        reverse_file(input_file.path(), &out_path, &PipelineConfig::default()).unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(out_path.exists(), "partial output must not be deleted");
}

#[test]
fn test_even_buffer_count_rejected() {
    let config = PipelineConfig { buffer_count: 8, ..PipelineConfig::default() };
    let err = reverse_bytes_with(b"x\n", &config).unwrap_err();
    assert!(matches!(err, ReverseError::Usage { .. }));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn test_non_power_of_two_queue_rejected() {
    let config = PipelineConfig { queue_capacity: 12, ..PipelineConfig::default() };
    let err = reverse_bytes_with(b"x\n", &config).unwrap_err();
    assert!(matches!(err, ReverseError::Usage { .. }));
}

#[test]
fn test_tiny_buffer_size_rejected() {
    let config = PipelineConfig { buffer_size: 16, ..PipelineConfig::default() };
    let err = reverse_bytes_with(b"x\n", &config).unwrap_err();
    assert!(matches!(err, ReverseError::Usage { .. }));
}

#[test]
fn test_queue_capacity_must_exceed_job_count() {
    // buffer-count 9 implies 4 jobs; a capacity-4 ring holds only 3.
    let config = PipelineConfig { queue_capacity: 4, ..PipelineConfig::default() };
    let err = reverse_bytes_with(b"x\n", &config).unwrap_err();
    assert!(matches!(err, ReverseError::Usage { .. }));
}

#[test]
fn test_missing_input_is_io_error() {
    let out_dir = tempfile::TempDir::new().unwrap();
    let out_path = out_dir.path().join("out.txt");
    let err =
        reverse_file(&missing_path(), &out_path, &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, ReverseError::Io(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_unwritable_output_is_io_error() {
    let input_file = temp_input(b"x\n");
    let err = reverse_file(
        input_file.path(),
        &missing_path(),
        &PipelineConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ReverseError::Io(_)));
}
