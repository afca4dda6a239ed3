//! End-to-end scenarios for the `reverse` pipeline over real files.

use crate::helpers::{
    reverse_bytes, reverse_bytes_summarized, reverse_bytes_with, small_buffer_config,
};
use linerev_lib::pipeline::PipelineConfig;

#[test]
fn test_single_short_line_no_terminator() {
    let out = reverse_bytes(b"hello").unwrap();
    assert_eq!(out, b"olleh");
}

#[test]
fn test_two_lines_lf_only() {
    let out = reverse_bytes(b"hello\nworld\n").unwrap();
    assert_eq!(out, b"olleh\ndlrow\n");
}

#[test]
fn test_crlf_preserved() {
    let out = reverse_bytes(b"AB\r\nCD\r\n").unwrap();
    assert_eq!(out, b"BA\r\nDC\r\n");
}

#[test]
fn test_multibyte_codepoint_aware() {
    // 68 C3 A9 6C 6C 6F 0A reverses to 6F 6C 6C C3 A9 68 0A: the C3 A9
    // pair stays together.
    let out = reverse_bytes("héllo\n".as_bytes()).unwrap();
    assert_eq!(out, "olléh\n".as_bytes());
    assert_eq!(out, &[0x6F, 0x6C, 0x6C, 0xC3, 0xA9, 0x68, 0x0A]);
}

#[test]
fn test_line_spanning_buffer_boundary() {
    // A palindromic first line longer than the buffer isolates the carry
    // path: the output must equal the input.
    let mut input = vec![b'A'; 100];
    input.extend_from_slice(b"\nBB\n");
    let out = reverse_bytes_with(&input, &small_buffer_config(64)).unwrap();
    assert_eq!(out, input);
}

#[test]
fn test_final_line_without_terminator_multi_buffer() {
    let out = reverse_bytes_with(b"xyz\nabcdefgh", &small_buffer_config(64)).unwrap();
    assert_eq!(out, b"zyx\nhgfedcba");
}

#[test]
fn test_empty_file() {
    let out = reverse_bytes(b"").unwrap();
    assert_eq!(out, b"");
}

#[test]
fn test_empty_lines_only() {
    let out = reverse_bytes(b"\n\n\n").unwrap();
    assert_eq!(out, b"\n\n\n");
}

#[test]
fn test_mixed_terminators() {
    let out = reverse_bytes(b"one\r\ntwo\nthree\r\n").unwrap();
    assert_eq!(out, b"eno\r\nowt\neerht\r\n");
}

#[test]
fn test_summary_reports_line_and_byte_totals() {
    let input = b"ab\ncd\nef\n";
    let (out, summary) = reverse_bytes_summarized(input, &PipelineConfig::default()).unwrap();
    assert_eq!(out.len(), input.len());
    assert_eq!(summary.bytes_read, input.len() as u64);
    assert_eq!(summary.bytes_written, input.len() as u64);
    assert_eq!(summary.lines_reversed, 3);
}

#[test]
fn test_unterminated_final_line_counts_as_line() {
    let (_, summary) = reverse_bytes_summarized(b"ab\ncd", &PipelineConfig::default()).unwrap();
    assert_eq!(summary.lines_reversed, 2);
}

#[test]
fn test_output_file_created_and_truncated() {
    use linerev_lib::pipeline::reverse_file;

    let input = crate::helpers::temp_input(b"fresh\n");
    let out_dir = tempfile::TempDir::new().unwrap();
    let out_path = out_dir.path().join("out.txt");
    std::fs::write(&out_path, b"stale bytes that must disappear").unwrap();

    reverse_file(input.path(), &out_path, &PipelineConfig::default()).unwrap();
    assert_eq!(std::fs::read(&out_path).unwrap(), b"hserf\n");
}
