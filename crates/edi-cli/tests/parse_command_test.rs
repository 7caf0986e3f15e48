use std::env;
use std::fs;
use std::path::PathBuf;
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

fn orders() -> String {
    testdata_path("edi/orders.edi").to_string_lossy().into_owned()
}

fn schemas() -> String {
    testdata_path("schemas").to_string_lossy().into_owned()
}

fn run_edi(args: &[&str]) -> Output {
    Command::new(cargo_bin())
        .args(args)
        .output()
        .expect("run edi")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "expected success; stdout: {}; stderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).expect("stdout should be UTF-8")
}

#[test]
fn parse_command_reprints_interchange() {
    let output = run_edi(&["--schemas", &schemas(), "parse", &orders()]);
    let expected = fs::read_to_string(testdata_path("edi/orders.edi")).unwrap();
    assert_eq!(stdout_of(&output), expected);
}

#[test]
fn parse_command_outputs_json() {
    let output = run_edi(&["--schemas", &schemas(), "parse", &orders(), "--format", "json"]);
    let stdout = stdout_of(&output);

    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should contain valid JSON");
    assert_eq!(parsed["has_service_string_advice"], serde_json::json!(true));
    assert_eq!(parsed["separators"]["component"], serde_json::json!(":"));
    assert_eq!(parsed["root"]["id"], serde_json::json!("interchange"));
    assert_eq!(parsed["root"]["role"], serde_json::json!("interchange"));
}

#[test]
fn parse_command_outputs_xml() {
    let output = run_edi(&["--schemas", &schemas(), "parse", &orders(), "--format", "xml"]);
    let stdout = stdout_of(&output);
    assert!(stdout.starts_with("<?xml"));
    assert!(stdout.contains(r#"<e1004 name="Document/message number">PO-4711</e1004>"#));
    assert!(!stdout.contains("<!--"));

    let verbose = run_edi(&[
        "--schemas",
        &schemas(),
        "parse",
        &orders(),
        "--format",
        "xml",
        "--verbose",
    ]);
    assert!(stdout_of(&verbose).contains("<!-- Code specifying the document or message name. -->"));
}

#[test]
fn parse_command_prints_node_at_path() {
    let output = run_edi(&["--schemas", &schemas(), "parse", &orders(), "--path", "ORDERS/BGM/1004"]);
    assert_eq!(stdout_of(&output), "PO-4711\n");

    let segment = run_edi(&[
        "--schemas",
        &schemas(),
        "parse",
        &orders(),
        "--path",
        "ORDERS/DTM_container/DTM[1]",
    ]);
    assert_eq!(stdout_of(&segment), "DTM+2:20240322:102'\n");
}

#[test]
fn parse_command_reports_unknown_path() {
    let output = run_edi(&["--schemas", &schemas(), "parse", &orders(), "--path", "ORDERS/XYZ"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR:"));
}

#[test]
fn parse_command_translates_codes() {
    let output = run_edi(&[
        "--schemas",
        &schemas(),
        "--translate-codes",
        "parse",
        &orders(),
        "--path",
        "ORDERS/SG2_container/SG2_group[0]/NAD/3035",
    ]);
    assert_eq!(stdout_of(&output), "Buyer\n");
}

#[test]
fn config_file_supplies_settings() {
    let dir = TempDir::new().expect("temporary directory");
    let config = dir.path().join("edi.yaml");
    fs::write(
        &config,
        format!("schema_dir: {}\ntranslate_codes: true\n", schemas()),
    )
    .expect("config should be writable");

    let output = run_edi(&[
        "--config",
        config.to_string_lossy().as_ref(),
        "parse",
        &orders(),
        "--path",
        "ORDERS/BGM/C002/1001",
    ]);
    assert_eq!(stdout_of(&output), "Order\n");
}

#[test]
fn invalid_config_returns_fatal_exit_code() {
    let dir = TempDir::new().expect("temporary directory");
    let config = dir.path().join("bad.yaml");
    fs::write(&config, "color: neon").expect("config should be writable");

    let output = run_edi(&["--config", config.to_string_lossy().as_ref(), "parse", &orders()]);

    assert_eq!(output.status.code(), Some(3));
    assert!(
        String::from_utf8_lossy(&output.stderr).contains("ERROR:"),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn parse_command_fails_on_syntax_error() {
    let truncated = testdata_path("edi/orders_truncated.edi");
    let output = run_edi(&["--schemas", &schemas(), "parse", truncated.to_string_lossy().as_ref()]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to parse"), "stderr: {stderr}");
    assert!(stderr.contains("UNZ"), "stderr: {stderr}");
}
