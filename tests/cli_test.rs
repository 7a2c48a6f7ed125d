//! Integration tests for the outfit binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_project(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let outfit_dir = temp.path().join(".outfit");
    fs::create_dir_all(&outfit_dir).unwrap();
    fs::write(outfit_dir.join("config.yml"), config).unwrap();
    temp
}

const GHOST_CONFIG: &str = r#"
tools:
  ghost:
    executable: outfit-test-ghost-tool
    url: http://127.0.0.1:9/ghost.tar.gz
    install: tar xf ${artifact}
    scope: user
"#;

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("outfit"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("tool"))
        .stdout(predicate::str::contains("python"))
        .stdout(predicate::str::contains("status"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("outfit"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_requires_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("outfit"));
    cmd.assert().failure();
    Ok(())
}

#[test]
fn cli_unknown_tool_exits_1() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = Command::new(cargo_bin("outfit"));
    cmd.args(["tool", "no-such-tool", "--project"]).arg(temp.path());
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown tool: no-such-tool"));
    Ok(())
}

#[test]
fn cli_invalid_config_exits_1() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project("tools: [unclosed");
    let mut cmd = Command::new(cargo_bin("outfit"));
    cmd.current_dir(temp.path()).args(["tool", "ghost"]);
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config"));
    Ok(())
}

#[test]
fn cli_tool_dry_run_json_report() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(GHOST_CONFIG);
    let mut cmd = Command::new(cargo_bin("outfit"));
    cmd.current_dir(temp.path())
        .args(["tool", "ghost", "--dry-run", "--json"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"tool\": \"ghost\""))
        .stdout(predicate::str::contains("\"stage\": \"downloaded\""))
        .stdout(predicate::str::contains("\"status\": \"skipped\""))
        .stdout(predicate::str::contains("\"exit_code\": 0"));
    Ok(())
}

#[test]
fn cli_tool_download_failure_exits_2() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(GHOST_CONFIG);
    let mut cmd = Command::new(cargo_bin("outfit"));
    cmd.current_dir(temp.path())
        .env("TMPDIR", temp.path())
        .args(["tool", "ghost", "--json"]);
    cmd.assert()
        .code(2)
        .stdout(predicate::str::contains("\"exit_code\": 2"))
        .stdout(predicate::str::contains("\"stage\": \"cleaned\""));
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_tool_already_present_exits_0() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::fs::PermissionsExt;

    let temp = setup_project(GHOST_CONFIG);
    let bin = temp.path().join("bin");
    fs::create_dir_all(&bin)?;
    let exe = bin.join("outfit-test-ghost-tool");
    fs::write(&exe, "#!/bin/sh\n")?;
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755))?;

    let mut cmd = Command::new(cargo_bin("outfit"));
    cmd.current_dir(temp.path())
        .env("PATH", &bin)
        .args(["tool", "ghost"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("already installed"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn cli_status_json_reports_location() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::fs::PermissionsExt;

    let temp = setup_project(GHOST_CONFIG);
    let bin = temp.path().join("bin");
    fs::create_dir_all(&bin)?;
    let exe = bin.join("outfit-test-ghost-tool");
    fs::write(&exe, "")?;
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755))?;

    let mut cmd = Command::new(cargo_bin("outfit"));
    cmd.current_dir(temp.path())
        .env("PATH", &bin)
        .args(["status", "ghost", "--json"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"installed\": true"))
        .stdout(predicate::str::contains("search_path"));
    Ok(())
}

#[test]
fn cli_status_missing_tool() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(GHOST_CONFIG);
    let mut cmd = Command::new(cargo_bin("outfit"));
    cmd.current_dir(temp.path()).args(["status", "ghost"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("not installed"));
    Ok(())
}

#[test]
fn cli_python_missing_manifest_exits_2() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let project = temp.path().join("work").join("project");
    fs::create_dir_all(&project)?;
    let env_root = temp.path().join("envs").join("venv");

    let mut cmd = Command::new(cargo_bin("outfit"));
    cmd.args(["python", "--project"])
        .arg(&project)
        .arg(&env_root)
        .arg("--force");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("requirements.txt"));

    assert!(!env_root.exists());
    Ok(())
}

#[test]
fn cli_python_explicit_missing_manifest_exits_2() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    fs::write(temp.path().join("requirements.txt"), "numpy\n")?;

    let mut cmd = Command::new(cargo_bin("outfit"));
    cmd.current_dir(temp.path())
        .arg("python")
        .arg(temp.path().join("venv"))
        .args(["--manifest", "does-not-exist.txt"]);
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("does-not-exist.txt"));
    Ok(())
}

#[test]
fn cli_completions_bash() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("outfit"));
    cmd.args(["completions", "bash"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("outfit"));
    Ok(())
}
