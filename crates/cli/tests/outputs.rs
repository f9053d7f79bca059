use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

const REFERENCE_VECTOR: &str = r#"
schema_version: "1.0"
name: "reference"
key: "FA7B0BCA183295E4A327B8C72A1A4DFF"
identifier: "0309"
payload: "000000000000000000000000"
freshness: "0000000000000000"
expected_mac: "6A0E6D"
"#;

fn write_temp_file(prefix: &str, contents: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push("secoc-tests");
    let _ = std::fs::create_dir_all(&dir);

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = dir.join(format!("{}-{}.yaml", prefix, nonce));
    std::fs::write(&path, contents).expect("Failed to write temp file");
    path
}

fn run_json(args: &[&str]) -> (std::process::Output, serde_json::Value) {
    let output = Command::new(env!("CARGO_BIN_EXE_secoc"))
        .args(args)
        .arg("--json")
        .output()
        .expect("Failed to execute secoc");
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(&stdout).expect("stdout is not JSON");
    (output, report)
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_secoc"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("SecOC CMAC authenticator self-test"));
}

#[test]
fn test_cli_reference_vector_passes() {
    let (output, report) = run_json(&[]);

    assert!(output.status.success());
    assert_eq!(report["status"], "pass");
    assert_eq!(report["code"], 0);
    assert_eq!(report["full_mac"], "6A0E6D87C6F90E165D058C2CF90615E2");
    assert_eq!(report["truncated_mac"], "6A0E6D");

    let lines = report["lines"].as_array().unwrap();
    assert_eq!(lines[0], "Starting CMAC computation...");
    assert_eq!(
        lines.last().unwrap(),
        "CMAC test passed. Calculated MAC: 6A 0E 6D"
    );
}

#[test]
fn test_cli_vector_file_passes() {
    let path = write_temp_file("reference", REFERENCE_VECTOR);
    let (output, report) = run_json(&["--vector", path.to_str().unwrap()]);

    assert!(output.status.success());
    assert_eq!(report["name"], "reference");
    assert_eq!(report["status"], "pass");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_cli_longer_authenticator() {
    let contents = REFERENCE_VECTOR.replace("\"6A0E6D\"", "\"6A0E6D87\"\ntruncation_len: 4");
    let path = write_temp_file("four-bytes", &contents);
    let (output, report) = run_json(&["--vector", path.to_str().unwrap()]);

    assert!(output.status.success());
    assert_eq!(report["truncated_mac"], "6A0E6D87");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_cli_mismatch_exit_code() {
    let contents = REFERENCE_VECTOR.replace("\"6A0E6D\"", "\"000000\"");
    let path = write_temp_file("mismatch", &contents);
    let (output, report) = run_json(&["--vector", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(6));
    assert_eq!(report["status"], "fail");
    assert_eq!(report["code"], -6);
    assert_eq!(report["expected_mac"], "000000");
    assert_eq!(report["full_mac"], "6A0E6D87C6F90E165D058C2CF90615E2");
    assert_eq!(report["truncated_mac"], "6A0E6D");
    assert!(report["lines"]
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l == "MAC verification failed. Calculated: 6A 0E 6D Received: 00 00 00"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_cli_rejects_invalid_vector() {
    let contents = REFERENCE_VECTOR.replace("\"1.0\"", "\"9.9\"");
    let path = write_temp_file("bad-schema", &contents);

    let output = Command::new(env!("CARGO_BIN_EXE_secoc"))
        .args(["--vector", path.to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Unsupported schema_version"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_cli_missing_vector_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_secoc"))
        .arg("-v")
        .arg("non_existent_vector.yaml")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
}
