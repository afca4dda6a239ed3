//! End-to-end tests of the installed binary: subcommands and exit codes.
//!
//! The exit-code contract is part of the CLI surface: `0` success, `1` I/O,
//! `2` malformed UTF-8, `3` line budget, `4` usage. These tests run the
//! compiled binary so the mapping is checked for real processes, not just
//! library errors.

use std::path::Path;
use std::process::Command;

use crate::helpers::temp_input;

fn linerev() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_linerev"));
    cmd.env("RUST_LOG", "error");
    cmd
}

fn run_reverse(input: &[u8], extra_args: &[&str]) -> (i32, Vec<u8>) {
    let input_file = temp_input(input);
    let out_dir = tempfile::TempDir::new().unwrap();
    let out_path = out_dir.path().join("out.txt");

    let status = linerev()
        .arg("reverse")
        .arg(input_file.path())
        .arg(&out_path)
        .args(extra_args)
        .status()
        .expect("spawn linerev");
    let output = std::fs::read(&out_path).unwrap_or_default();
    (status.code().expect("exit code"), output)
}

#[test]
fn test_reverse_success_exit_zero() {
    let (code, output) = run_reverse(b"hello\nworld\n", &[]);
    assert_eq!(code, 0);
    assert_eq!(output, b"olleh\ndlrow\n");
}

#[test]
fn test_malformed_utf8_exit_two() {
    let (code, _) = run_reverse(&[b'a', 0xFF, b'\n'], &[]);
    assert_eq!(code, 2);
}

#[test]
fn test_line_budget_violation_exit_three() {
    let input = vec![b'q'; 1024];
    let (code, _) = run_reverse(&input, &["--buffer-size", "64", "--buffer-count", "5"]);
    assert_eq!(code, 3);
}

#[test]
fn test_bad_flag_value_exit_four() {
    let (code, _) = run_reverse(b"x\n", &["--buffer-count", "4"]);
    assert_eq!(code, 4);
}

#[test]
fn test_unknown_flag_exit_four() {
    let status = linerev().arg("reverse").arg("--frobnicate").status().unwrap();
    assert_eq!(status.code().unwrap(), 4);
}

#[test]
fn test_missing_input_exit_four() {
    let status = linerev()
        .arg("reverse")
        .arg("/nonexistent/linerev/in.txt")
        .arg("/tmp/linerev-out.txt")
        .status()
        .unwrap();
    assert_eq!(status.code().unwrap(), 4);
}

#[test]
fn test_help_exits_zero() {
    let status = linerev().arg("--help").status().unwrap();
    assert_eq!(status.code().unwrap(), 0);
}

fn run_verify(input_path: &Path, output_path: &Path) -> i32 {
    linerev()
        .arg("verify")
        .arg(input_path)
        .arg(output_path)
        .status()
        .expect("spawn linerev")
        .code()
        .expect("exit code")
}

#[test]
fn test_verify_accepts_correct_output() {
    let input = temp_input("one\nhéllo\r\nlast".as_bytes());
    let output = temp_input("eno\nolléh\r\ntsal".as_bytes());
    assert_eq!(run_verify(input.path(), output.path()), 0);
}

#[test]
fn test_verify_accepts_reverse_output_end_to_end() {
    let input = temp_input(b"alpha\nbeta\r\ngamma");
    let out_dir = tempfile::TempDir::new().unwrap();
    let out_path = out_dir.path().join("out.txt");

    let status =
        linerev().arg("reverse").arg(input.path()).arg(&out_path).status().unwrap();
    assert_eq!(status.code().unwrap(), 0);
    assert_eq!(run_verify(input.path(), &out_path), 0);
}

#[test]
fn test_verify_rejects_corrupted_output() {
    let input = temp_input(b"one\ntwo\n");
    let output = temp_input(b"eno\nowl\n");
    assert_ne!(run_verify(input.path(), output.path()), 0);
}

#[test]
fn test_verify_rejects_truncated_output() {
    let input = temp_input(b"one\ntwo\n");
    let output = temp_input(b"eno\n");
    assert_ne!(run_verify(input.path(), output.path()), 0);
}

#[test]
fn test_verify_rejects_extra_output() {
    let input = temp_input(b"one\n");
    let output = temp_input(b"eno\nextra\n");
    assert_ne!(run_verify(input.path(), output.path()), 0);
}
