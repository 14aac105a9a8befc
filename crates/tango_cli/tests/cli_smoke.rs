use std::process::Command;

#[test]
fn cli_smoke_help() {
    let exe = env!("CARGO_BIN_EXE_tasktango");
    let output = Command::new(exe)
        .arg("--help")
        .output()
        .expect("failed to run tasktango --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("add"));
}

#[test]
fn cli_rejects_unknown_command() {
    let exe = env!("CARGO_BIN_EXE_tasktango");
    let output = Command::new(exe)
        .arg("frobnicate")
        .env("TASKTANGO_DISABLE_NOTIFICATIONS", "1")
        .output()
        .expect("failed to run tasktango");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}
