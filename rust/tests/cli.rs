use std::fs;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_paragraph-hash"))
        .args(args)
        .env("PARAGRAPH_HASH_COST", "4")
        .env_remove("PARAGRAPH_HASH_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("binary should run")
}

fn text_file(text: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    fs::write(file.path(), text).expect("write text");
    file
}

#[test]
fn prints_hash_and_newline() {
    let file = text_file("hello world");
    let output = run_cli(&[file.path().to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.ends_with('\n'));
    let hash = stdout.trim_end();
    assert!(hash.starts_with("$2b$04$"));
    assert_eq!(hash.len(), 60);
    assert!(paragraph_hash::crypto::verify_password(b"hello world", hash).unwrap());
}

#[test]
fn missing_argument_is_a_usage_error() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn unreadable_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.txt");
    let output = run_cli(&[missing.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.txt"));
}

#[test]
fn invalid_cost_fails_without_hashing() {
    let file = text_file("hello world");
    let output = run_cli(&["--cost", "3", file.path().to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid cost"));
}

#[test]
fn verifies_against_existing_hash() {
    let file = text_file("hello world");
    let hash = paragraph_hash::crypto::hash_password(b"hello world", 4)
        .unwrap()
        .to_string();

    let matched = run_cli(&["--verify", &hash, file.path().to_str().unwrap()]);
    assert!(matched.status.success());
    assert_eq!(String::from_utf8(matched.stdout).unwrap(), "match\n");

    let other = text_file("goodbye");
    let hash_file = text_file(&format!("{hash}\n"));
    let mismatched = run_cli(&[
        "--verify-file",
        hash_file.path().to_str().unwrap(),
        other.path().to_str().unwrap(),
    ]);
    assert_eq!(mismatched.status.code(), Some(1));
    assert_eq!(String::from_utf8(mismatched.stdout).unwrap(), "no-match\n");
}

#[test]
fn rejects_long_input_on_request() {
    let file = text_file(&"x".repeat(100));

    let truncated = run_cli(&[file.path().to_str().unwrap()]);
    assert!(truncated.status.success());

    let rejected = run_cli(&["--reject-long-input", file.path().to_str().unwrap()]);
    assert_eq!(rejected.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&rejected.stderr).contains("at most 72"));
}

#[test]
fn config_file_sets_version() {
    let file = text_file("hello world");
    let config = text_file(r#"{ "version": "2y" }"#);
    let output = run_cli(&["--config", config.path().to_str().unwrap(), file.path().to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("$2y$04$"));
}
