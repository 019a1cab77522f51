//! End-to-end tests for the `bt` binary.
//!
//! Each test writes an events file into a temp directory and runs the real
//! binary against it with an isolated HOME, so no user config leaks in.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn bt_binary() -> String {
    env!("CARGO_BIN_EXE_bt").to_string()
}

const OVERNIGHT: &str = r#"[
    {"id": "sleep-1", "eventType": "sleep", "startTime": "2024-03-01T20:00:00", "endTime": "2024-03-02T06:30:00"},
    {"id": "waking-1", "eventType": "night_waking", "startTime": "2024-03-02T02:15:00", "endTime": "2024-03-02T02:25:00"},
    {"id": "feed-1", "eventType": "feeding", "startTime": "2024-03-01T17:00:00", "endTime": "2024-03-01T17:20:00", "feedingType": "bottle"},
    {"id": "wake-1", "eventType": "wake", "startTime": "2024-03-02T06:30:00"}
]"#;

fn write_events(temp: &Path, content: &str) -> std::path::PathBuf {
    let path = temp.join("events.json");
    std::fs::write(&path, content).unwrap();
    path
}

fn bt(temp: &Path, args: &[&str]) -> Output {
    Command::new(bt_binary())
        .env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join("config"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run bt")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "bt should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_day_json_for_both_fragments() {
    let temp = TempDir::new().unwrap();
    let input = write_events(temp.path(), OVERNIGHT);
    let input = input.to_str().unwrap();

    let first = json_stdout(&bt(
        temp.path(),
        &["day", "--input", input, "--date", "2024-03-01", "--now", "2024-03-05T12:00:00", "--json"],
    ));
    assert_eq!(first["sessions"][0]["block"]["topPx"], 600.0);
    assert_eq!(first["sessions"][0]["block"]["heightPx"], 120.0);
    assert_eq!(first["sessions"][0]["continuesNextDay"], true);
    assert_eq!(first["otherEvents"][0]["id"], "feed-1");

    let second = json_stdout(&bt(
        temp.path(),
        &["day", "--input", input, "--date", "2024-03-02", "--now", "2024-03-05T12:00:00", "--json"],
    ));
    let session = &second["sessions"][0];
    assert_eq!(session["block"]["topPx"], 0.0);
    assert_eq!(session["block"]["heightPx"], 195.0);
    assert_eq!(session["isContinuationFromPrevious"], true);
    assert_eq!(session["nightWakings"][0]["id"], "waking-1");
    assert_eq!(session["nightWakings"][0]["topPx"], 67.5);
    assert_eq!(second["otherEvents"][0]["id"], "wake-1");
}

#[test]
fn test_day_text_output() {
    let temp = TempDir::new().unwrap();
    let input = write_events(temp.path(), OVERNIGHT);

    let output = bt(
        temp.path(),
        &[
            "day",
            "--input",
            input.to_str().unwrap(),
            "--date",
            "2024-03-02",
            "--now",
            "2024-03-05T12:00:00",
        ],
    );
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("sleep 00:00-06:30 (10h 30m) [from previous day]"));
    assert!(text.contains("night_waking 02:15"));
}

#[test]
fn test_day_reads_stdin() {
    let temp = TempDir::new().unwrap();
    let mut child = Command::new(bt_binary())
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join("config"))
        .args(["day", "--input", "-", "--date", "2024-03-01", "--now", "2024-03-05T12:00:00", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(OVERNIGHT.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let json = json_stdout(&output);
    assert_eq!(json["date"], "2024-03-01");
    assert_eq!(json["sessions"].as_array().unwrap().len(), 1);
}

#[test]
fn test_week_json_has_seven_days() {
    let temp = TempDir::new().unwrap();
    let input = write_events(temp.path(), OVERNIGHT);

    let json = json_stdout(&bt(
        temp.path(),
        &[
            "week",
            "--input",
            input.to_str().unwrap(),
            "--date",
            "2024-03-01",
            "--now",
            "2024-03-05T12:00:00",
            "--json",
        ],
    ));
    // Mar 1, 2024 is a Friday
    assert_eq!(json["weekStart"], "2024-02-26");
    let days = json["days"].as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[4]["sessions"][0]["continuesNextDay"], true);
    assert_eq!(days[5]["sessions"][0]["isContinuationFromPrevious"], true);
}

#[test]
fn test_config_file_changes_scale() {
    let temp = TempDir::new().unwrap();
    let input = write_events(temp.path(), OVERNIGHT);
    let config = temp.path().join("bt.toml");
    std::fs::write(&config, "[layout]\npixels_per_hour = 60\n").unwrap();

    let json = json_stdout(&bt(
        temp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "day",
            "--input",
            input.to_str().unwrap(),
            "--date",
            "2024-03-01",
            "--now",
            "2024-03-05T12:00:00",
            "--json",
        ],
    ));
    assert_eq!(json["sessions"][0]["block"]["topPx"], 1200.0);
    assert_eq!(json["sessions"][0]["block"]["heightPx"], 240.0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp = TempDir::new().unwrap();
    let input = write_events(temp.path(), OVERNIGHT);
    let config = temp.path().join("bt.toml");
    std::fs::write(&config, "[layout]\npixels_per_hour = 0\n").unwrap();

    let output = bt(
        temp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "day",
            "--input",
            input.to_str().unwrap(),
            "--date",
            "2024-03-01",
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid layout configuration"));
}

#[test]
fn test_unreadable_records_do_not_abort_layout() {
    let temp = TempDir::new().unwrap();
    let input = write_events(
        temp.path(),
        r#"[
            {"id": "bath-1", "eventType": "bath", "startTime": "2024-03-01T18:00:00"},
            {"id": "nap-1", "eventType": "nap", "startTime": "2024-03-01T13:00:00", "endTime": "2024-03-01T14:00:00"}
        ]"#,
    );

    let json = json_stdout(&bt(
        temp.path(),
        &[
            "day",
            "--input",
            input.to_str().unwrap(),
            "--date",
            "2024-03-01",
            "--now",
            "2024-03-05T12:00:00",
            "--json",
        ],
    ));
    assert_eq!(json["sessions"][0]["id"], "nap-1");
    assert_eq!(json["unreadable"][0]["position"], 0);
}

#[test]
fn test_check_exit_status() {
    let temp = TempDir::new().unwrap();

    let clean = write_events(temp.path(), OVERNIGHT);
    let output = bt(temp.path(), &["check", "--input", clean.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "4 events OK\n");

    let broken = write_events(
        temp.path(),
        r#"[{"id": "x", "eventType": "feeding", "startTime": "yesterday"}]"#,
    );
    let output = bt(temp.path(), &["check", "--input", broken.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().contains("x: malformed startTime"));
}

#[test]
fn test_missing_input_file_fails() {
    let temp = TempDir::new().unwrap();
    let output = bt(
        temp.path(),
        &["day", "--input", "/nonexistent/events.json", "--date", "2024-03-01"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}
