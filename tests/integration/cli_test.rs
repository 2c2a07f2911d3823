//! Integration tests for headless mode.

use std::io::Write;
use std::process::Command;

use tempfile::NamedTempFile;

fn run_headless(args: &[&str], env: &[(&str, &str)]) -> (i32, String, String) {
    // An empty config file keeps the user's own config out of the picture.
    let config = NamedTempFile::new().unwrap();

    let mut command = Command::new(env!("CARGO_BIN_EXE_trendboard"));
    command
        .args(["--headless", "--mock-db", "--config"])
        .arg(config.path())
        .args(args)
        .env_remove("ADMIN_PASSWORD")
        .env_remove("TRENDBOARD_ADMIN_PASSWORD")
        .env("RUST_LOG", "off");
    for (key, value) in env {
        command.env(key, value);
    }

    let output = command.output().expect("Failed to execute command");
    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

#[test]
fn test_headless_report_text() {
    let (code, stdout, _) = run_headless(&["--report", "top-songs"], &[]);

    assert_eq!(code, 0);
    assert!(stdout.starts_with("Top Songs Based on Popularity"));
    assert!(stdout.contains("Blinding Lights"));
    assert!(stdout.contains("Total Popularity by Song"));
}

#[test]
fn test_headless_regional_json() {
    let (code, stdout, _) = run_headless(
        &[
            "--report",
            "regional-trends",
            "--country",
            "Japan",
            "--output",
            "json",
        ],
        &[],
    );

    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["outcome"], "rows");
    assert_eq!(json["title"], "Explore Regional Trends");
    assert_eq!(json["records"][0][0], "Anti-Hero");
}

#[test]
fn test_headless_select_as_analyst() {
    let (code, stdout, _) = run_headless(
        &["--query", "SELECT name FROM countries", "--output", "json"],
        &[],
    );

    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["outcome"], "rows");
}

#[test]
fn test_headless_analyst_write_is_denied() {
    let (code, stdout, _) = run_headless(&["--query", "DELETE FROM songs"], &[]);

    assert_eq!(code, 2);
    assert!(stdout.contains("restricted role: only read queries permitted"));
}

#[test]
fn test_headless_admin_write_is_acknowledged() {
    let (code, stdout, stderr) = run_headless(
        &[
            "--query",
            "DELETE FROM songs",
            "--admin",
            "--admin-password",
            "open-sesame",
        ],
        &[("ADMIN_PASSWORD", "open-sesame")],
    );

    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("Query executed successfully!"));
}

#[test]
fn test_headless_admin_wrong_password_warns() {
    let (code, _, stderr) = run_headless(
        &[
            "--query",
            "DELETE FROM songs",
            "--admin",
            "--admin-password",
            "guess",
        ],
        &[("ADMIN_PASSWORD", "open-sesame")],
    );

    assert_eq!(code, 2);
    assert!(stderr.contains("incorrect admin password"));
}

#[test]
fn test_headless_empty_query_prints_nothing() {
    let (code, stdout, _) = run_headless(&["--query", "  "], &[]);

    assert_eq!(code, 0);
    assert_eq!(stdout, "");
}

#[test]
fn test_headless_requires_a_request() {
    let (code, _, stderr) = run_headless(&[], &[]);

    assert_eq!(code, 1);
    assert!(stderr.contains("--headless requires --report or --query"));
}

#[test]
fn test_headless_bad_config_fails() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "[connection\nhost = ").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_trendboard"))
        .args(["--headless", "--mock-db", "--report", "top-songs", "--config"])
        .arg(config.path())
        .env("RUST_LOG", "off")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Configuration error"));
}
