//! Tests for the compiled binary

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn manifest() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources/main_test.yaml")
}

fn centry() -> Command {
    let mut cmd = Command::cargo_bin("centry").unwrap();
    cmd.env_remove("OUTPUT_DEBUG");
    cmd
}

#[test]
fn given_command_when_running_binary_then_function_output_is_streamed() {
    centry()
        .arg(manifest())
        .args(["--quiet", "get", "foo", "bar"])
        .assert()
        .success()
        .stdout("get (foo bar)\n");
}

#[test]
fn given_failing_function_when_running_binary_then_exit_code_is_propagated() {
    centry()
        .arg(manifest())
        .args(["--quiet", "test", "exit", "42"])
        .assert()
        .code(42);
}

#[test]
fn given_unknown_command_when_running_binary_then_exits_127() {
    centry()
        .arg(manifest())
        .args(["--quiet", "nope"])
        .assert()
        .code(127)
        .stderr(predicate::str::contains("unknown command \"nope\""))
        .stderr(predicate::str::contains("Usage: centry"));
}

#[test]
fn given_no_manifest_when_running_binary_then_exits_with_config_error() {
    centry()
        .assert()
        .code(78)
        .stderr(predicate::str::contains("failed to read manifest file"));
}

#[test]
fn given_unknown_option_when_running_binary_then_exits_with_usage_error() {
    centry()
        .arg(manifest())
        .args(["--quiet", "--bogus", "get"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("unknown option: --bogus"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn given_help_flag_when_running_binary_then_generated_help_is_shown() {
    centry()
        .arg(manifest())
        .args(["--quiet", "--help"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Global options:"))
        .stderr(predicate::str::contains("info"));
}

#[test]
fn given_info_builtin_when_running_binary_then_command_tree_is_printed() {
    centry()
        .arg(manifest())
        .args(["--quiet", "info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("version:   1.0.0"))
        .stdout(predicate::str::contains("sub"));
}
