use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tasktango-{nanos}-{file_name}"))
}

fn run(args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_tasktango");
    Command::new(exe)
        .args(args)
        .env("TASKTANGO_CONFIG_PATH", temp_path("missing-config.json"))
        .env("TASKTANGO_DISABLE_NOTIFICATIONS", "1")
        .env_remove("TASKTANGO_SUGGEST_ENDPOINT")
        .output()
        .expect("failed to run add command")
}

#[test]
fn add_command_succeeds_without_suggestion_service() {
    let output = run(&["add", "Buy milk"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: Buy milk (task-1)"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("ALERT: Uh oh! Something went wrong.").count(), 1);
}

#[test]
fn add_command_records_selected_date() {
    let output = run(&["add", "Write report", "--date", "2024-06-01"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Write report (task-1) (Deadline: 2024-06-01)"));
}

#[test]
fn add_command_json_output() {
    let output = run(&["--json", "add", "Write report", "--date", "2024-06-01"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next().expect("task line");
    let task: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(task["id"], "task-1");
    assert_eq!(task["text"], "Write report");
    assert_eq!(task["completed"], false);
    assert_eq!(task["deadline"], "2024-06-01");
}

#[test]
fn add_command_rejects_missing_text() {
    let output = run(&["add"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - task text is required"));
    assert!(!stderr.contains("ALERT"));
}

#[test]
fn add_command_rejects_bad_date() {
    let output = run(&["add", "Write report", "--date", "June 1st"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - date must be YYYY-MM-DD"));
}

#[test]
fn invalid_config_override_fails() {
    let output = run(&["--config-override", "suggest.policy=random", "list"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}
