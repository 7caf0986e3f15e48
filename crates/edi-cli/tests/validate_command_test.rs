use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn cargo_bin() -> PathBuf {
    if let Ok(path) = env::var("CARGO_BIN_EXE_edi") {
        return PathBuf::from(path);
    }

    let target_dir = env::var("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| repo_root().join("target"));
    let executable_name = format!("edi{}", std::env::consts::EXE_SUFFIX);
    let fallback = target_dir.join("debug").join(executable_name);

    if fallback.exists() {
        return fallback;
    }

    panic!(
        "CARGO_BIN_EXE_edi is not set and fallback binary was not found at {}",
        fallback.display()
    );
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn testdata_path(path: &str) -> PathBuf {
    repo_root().join("testdata").join(path)
}

fn run_validate(input: &Path, extra: &[&str]) -> Output {
    let schemas = testdata_path("schemas");
    let mut args: Vec<String> = vec!["--schemas".into(), schemas.to_string_lossy().into_owned()];
    args.extend(extra.iter().map(|arg| (*arg).to_string()));
    args.push("validate".into());
    args.push(input.to_string_lossy().into_owned());

    Command::new(cargo_bin())
        .args(&args)
        .output()
        .expect("edi validate should execute")
}

fn assert_exit_code(output: &Output, expected: i32) {
    let actual = output.status.code().unwrap_or(-1);
    assert_eq!(
        actual,
        expected,
        "unexpected exit code; stdout: {}; stderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn validate_accepts_orders_interchange() {
    let output = run_validate(&testdata_path("edi/orders.edi"), &[]);
    assert_exit_code(&output, 0);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "valid");
}

#[test]
fn validate_accepts_functional_groups() {
    let output = run_validate(&testdata_path("edi/orders_groups.edi"), &["--strict"]);
    assert_exit_code(&output, 0);
}

#[test]
fn validate_rejects_truncated_interchange() {
    let output = run_validate(&testdata_path("edi/orders_truncated.edi"), &[]);
    assert_exit_code(&output, 1);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("invalid:"), "stdout: {stdout}");
    assert!(stdout.contains("UNZ"), "stdout: {stdout}");
}

#[test]
fn validate_recovers_only_in_lenient_mode() {
    let input = testdata_path("edi/orders_missing_dtm.edi");

    let lenient = run_validate(&input, &[]);
    assert_exit_code(&lenient, 0);

    let strict = run_validate(&input, &["--strict"]);
    assert_exit_code(&strict, 1);
    assert!(String::from_utf8_lossy(&strict.stdout).contains("\"DTM\""));
}

#[test]
fn validate_strict_rejects_overlong_value() {
    let dir = TempDir::new().expect("temporary directory");
    let input = dir.path().join("overlong.edi");
    let reference = "R".repeat(40);
    fs::write(
        &input,
        format!(
            "UNB+UNOC:4+SENDER+RECEIVER+20240315:1030+ORD9'\n\
             UNH+1+ORDERS:D:96A:UN'\n\
             BGM+220+{reference}+9'\n\
             DTM+137:20240315:102'\n\
             UNS+S'\n\
             UNT+5+1'\n\
             UNZ+1+ORD9'\n"
        ),
    )
    .expect("temporary file should be writable");

    assert_exit_code(&run_validate(&input, &[]), 0);

    let strict = run_validate(&input, &["--strict"]);
    assert_exit_code(&strict, 1);
    assert!(String::from_utf8_lossy(&strict.stdout).contains("1004"));
}

#[test]
fn validate_reports_missing_input() {
    let output = run_validate(&testdata_path("edi/does-not-exist.edi"), &[]);
    assert_exit_code(&output, 1);
    assert!(String::from_utf8_lossy(&output.stdout).contains("File not found"));
}

#[test]
fn validate_reports_unknown_message_type() {
    let dir = TempDir::new().expect("temporary directory");
    let input = dir.path().join("invoice.edi");
    fs::write(
        &input,
        "UNB+UNOC:4+SENDER+RECEIVER+20240315:1030+INV1'UNH+1+INVOIC:D:96A:UN'UNT+2+1'UNZ+1+INV1'",
    )
    .expect("temporary file should be writable");

    let output = run_validate(&input, &[]);
    assert_exit_code(&output, 1);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Mapping not found"));
}

#[test]
fn unsupported_standard_fails() {
    let output = run_validate(&testdata_path("edi/orders.edi"), &["--standard", "X12"]);
    assert_exit_code(&output, 1);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported standard: X12"));
}
