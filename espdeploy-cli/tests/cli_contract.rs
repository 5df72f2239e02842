//! Integration tests for core CLI contract behavior.
//!
//! None of these need a device attached: they exercise argument parsing, the
//! exit-code contract and stdout/stderr separation.

use {predicates::prelude::*, std::fs, tempfile::tempdir};

fn cli_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("espdeploy");
    // Keep host environment out of port resolution.
    cmd.env_remove("ESPDEPLOY_PORT");
    cmd.env("ESPDEPLOY_NON_INTERACTIVE", "true");
    cmd
}

#[test]
fn help_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("espdeploy"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn short_help_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("espdeploy"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn version_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("espdeploy"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn help_lists_all_commands() {
    let mut cmd = cli_cmd();
    let assert = cmd.arg("--help").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    for sub in [
        "devices",
        "device",
        "upload",
        "download",
        "run",
        "list",
        "tree",
        "delete",
        "flash",
        "diagnostics",
        "completions",
    ] {
        assert!(stdout.contains(sub), "help should list '{sub}'");
    }
}

#[test]
fn devices_json_returns_valid_json() {
    let mut cmd = cli_cmd();
    let output = cmd
        .args(["devices", "--json"])
        .output()
        .expect("command should execute");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("devices --json must emit valid JSON");
    assert!(parsed.is_array(), "should be a JSON array");
}

#[test]
fn devices_json_keeps_stderr_clean_on_success() {
    let mut cmd = cli_cmd();
    let output = cmd
        .args(["devices", "--json"])
        .output()
        .expect("command should execute");
    if output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(
            stderr.is_empty(),
            "JSON output should not have stderr: got {stderr}"
        );
    }
}

// ============================================================================
// Exit Code Tests - Following CLI Standards Contract
// ============================================================================

/// Exit code 0: successful operations
#[test]
fn exit_code_zero_on_success() {
    let mut cmd = cli_cmd();
    cmd.arg("--help").assert().success().code(0);

    let mut cmd = cli_cmd();
    cmd.arg("--version").assert().success().code(0);

    // completions bash exits 0 (doesn't require hardware)
    let mut cmd = cli_cmd();
    cmd.args(["completions", "bash"]).assert().success().code(0);
}

/// Exit code 2: usage error (unknown command, invalid arguments)
#[test]
fn exit_code_two_for_usage_error_unknown_command() {
    let mut cmd = cli_cmd();
    cmd.arg("unknown-command-xyz")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unrecognized").or(predicate::str::contains("unknown")));
}

#[test]
fn exit_code_two_for_usage_error_invalid_flag() {
    let mut cmd = cli_cmd();
    cmd.arg("--invalid-flag-xyz").assert().failure().code(2);
}

#[test]
fn exit_code_two_for_missing_required_arg() {
    // upload without a local source is a parse error.
    let mut cmd = cli_cmd();
    cmd.arg("upload").assert().failure().code(2);
}

/// Exit code 2: no port resolvable in non-interactive mode
#[test]
fn exit_code_two_when_no_port_configured() {
    let dir = tempdir().expect("tempdir should be created");
    let config = dir.path().join("config.json");
    fs::write(&config, "{}").expect("write empty config");

    let mut cmd = cli_cmd();
    let output = cmd
        .arg("--config")
        .arg(&config)
        .args(["list"])
        .output()
        .expect("command should execute");

    // Either no port is selected (exit 2) or the host has ports and the
    // command fails later at device level (exit 1). Never success.
    assert!(!output.status.success());
    let code = output.status.code().unwrap_or(-1);
    assert!(code == 1 || code == 2, "unexpected exit code {code}");
}

/// Corrupted config: warns but continues with defaults.
#[test]
fn corrupted_config_warns_but_continues() {
    let dir = tempdir().expect("tempdir should be created");
    let config = dir.path().join("config.json");
    fs::write(&config, "not json [[[").expect("write invalid config");

    let mut cmd = cli_cmd();
    let output = cmd
        .arg("--config")
        .arg(&config)
        .arg("devices")
        .output()
        .expect("command should execute");

    assert!(
        output.status.success(),
        "devices should succeed despite config warning"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("corrupted") || stderr.contains("defaults"),
        "should warn about the corrupted config: {stderr}"
    );
}

/// Exit code 1: runtime error (missing local file, no device involved yet
/// because planning fails first when a port is supplied).
#[test]
fn exit_code_one_for_missing_local_upload_source() {
    let dir = tempdir().expect("tempdir should be created");
    let missing = dir.path().join("does_not_exist.py");

    let mut cmd = cli_cmd();
    cmd.arg("--port")
        .arg("INVALID_PORT_XYZ")
        .arg("upload")
        .arg(missing.as_os_str())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn delete_root_non_interactive_without_yes_is_usage_error() {
    let mut cmd = cli_cmd();
    cmd.arg("--port")
        .arg("INVALID_PORT_XYZ")
        .arg("delete")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn flash_non_interactive_without_yes_is_usage_error() {
    // esptool may or may not be installed; when it is, the confirmation
    // gate must fail in non-interactive mode. Either way: no success.
    let mut cmd = cli_cmd();
    let output = cmd
        .arg("--port")
        .arg("INVALID_PORT_XYZ")
        .arg("flash")
        .output()
        .expect("command should execute");
    assert!(!output.status.success());
}

// ============================================================================
// Unknown Command/Flag Suggestion Tests
// ============================================================================

#[test]
fn unknown_command_suggests_similar() {
    let mut cmd = cli_cmd();
    cmd.arg("uplaod") // typo for upload
        .assert()
        .failure()
        .stderr(predicate::str::contains("upload").or(predicate::str::contains("similar")));
}

#[test]
fn unknown_flag_suggests_similar() {
    let mut cmd = cli_cmd();
    cmd.arg("devices")
        .arg("--jsno") // typo for --json
        .assert()
        .failure()
        .stderr(predicate::str::contains("json").or(predicate::str::contains("similar")));
}

// ============================================================================
// stdout/stderr Separation Tests
// ============================================================================

#[test]
fn error_output_goes_to_stderr_only() {
    let dir = tempdir().expect("tempdir should be created");
    let missing = dir.path().join("missing.py");

    let mut cmd = cli_cmd();
    cmd.arg("--port")
        .arg("INVALID_PORT_XYZ")
        .arg("upload")
        .arg(missing.as_os_str())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty().not());
}

#[test]
fn completions_command_writes_to_stdout() {
    let mut cmd = cli_cmd();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty())
        .stdout(predicate::str::contains("espdeploy"));
}

// ============================================================================
// -- Option Terminator Tests
// ============================================================================

#[test]
fn option_terminator_allows_dash_prefixed_operand() {
    let mut cmd = cli_cmd();
    cmd.arg("--port")
        .arg("INVALID_PORT_XYZ")
        .arg("upload")
        .arg("--")
        .arg("-weird-name.py")
        .assert()
        .failure() // file doesn't exist, but parsing works (exit 1, not 2)
        .code(1);
}

// ============================================================================
// Non-Interactive Mode Tests
// ============================================================================

#[test]
fn non_interactive_flag_is_recognized() {
    let mut cmd = cli_cmd();
    cmd.arg("--non-interactive")
        .arg("--version")
        .assert()
        .success();
}

#[test]
fn non_interactive_environment_variable_works() {
    let mut cmd = cli_cmd();
    cmd.env("ESPDEPLOY_NON_INTERACTIVE", "true")
        .arg("--version")
        .assert()
        .success();
}

// ============================================================================
// TTY Detection Tests (colors disabled on non-TTY)
// ============================================================================

#[test]
fn colors_disabled_when_not_tty() {
    let mut cmd = cli_cmd();
    let output = cmd.arg("--help").assert().success().get_output().clone();

    let stdout = String::from_utf8(output.stdout).expect("stdout should be utf-8");
    assert!(
        !stdout.contains("\x1b["),
        "Colors should be disabled in non-TTY mode"
    );
}

#[test]
fn device_errors_disable_colors_when_not_tty() {
    let dir = tempdir().expect("tempdir should be created");
    let missing = dir.path().join("missing.py");

    let mut cmd = cli_cmd();
    let output = cmd
        .arg("--port")
        .arg("INVALID_PORT_XYZ")
        .arg("upload")
        .arg(missing.as_os_str())
        .output()
        .expect("command should execute");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("\x1b["),
        "stderr colors should be disabled in non-TTY mode: {stderr}"
    );
}
