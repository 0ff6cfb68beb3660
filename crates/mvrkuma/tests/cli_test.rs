//! Integration tests for the `mvrkuma` CLI binary.
//!
//! These cover argument parsing, help output, completions, local show-file
//! commands, and error exit codes, all without a live Uptime Kuma server.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use mvrkuma_mvr::SceneDocument;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

const NONEXISTENT_HOME: &str = "/tmp/mvrkuma-cli-test-nonexistent";

/// Build a [`Command`] for the `mvrkuma` binary with env isolation.
///
/// Clears the `MVRKUMA_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn mvrkuma_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("mvrkuma");
    cmd.env("HOME", NONEXISTENT_HOME)
        .env("XDG_CONFIG_HOME", NONEXISTENT_HOME)
        .env_remove("MVRKUMA_CONFIG")
        .env_remove("MVRKUMA_URL")
        .env_remove("MVRKUMA_USERNAME")
        .env_remove("MVRKUMA_PASSWORD")
        .env_remove("MVRKUMA_TIMEOUT")
        .env_remove("MVRKUMA_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Same as [`mvrkuma_cmd`] with a complete server login in the environment.
fn configured_cmd() -> assert_cmd::Command {
    let mut cmd = mvrkuma_cmd();
    cmd.env("MVRKUMA_URL", "http://127.0.0.1:9")
        .env("MVRKUMA_USERNAME", "admin")
        .env("MVRKUMA_PASSWORD", "secret");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const SHOW: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GeneralSceneDescription verMajor="1" verMinor="6">
  <UserData/>
  <Scene>
    <AUXData>
      <Class name="Spots" uuid="C-1"/>
    </AUXData>
    <Layers>
      <Layer name="Stage" uuid="L-1">
        <ChildList>
          <Fixture name="Spot 1" uuid="F-1">
            <Classing>C-1</Classing>
            <Addresses>
              <Address break="0">1.1</Address>
              <Network geometry="NetworkInOut_1" ipv4="10.0.0.1"/>
            </Addresses>
          </Fixture>
          <Fixture name="Dark" uuid="F-2"/>
        </ChildList>
      </Layer>
    </Layers>
  </Scene>
</GeneralSceneDescription>
"#;

fn write_show(dir: &Path) -> PathBuf {
    let path = dir.join("show.mvr");
    SceneDocument::from_xml_str(SHOW).unwrap().write(&path).unwrap();
    path
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = mvrkuma_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    mvrkuma_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("MVR")
            .and(predicate::str::contains("import"))
            .and(predicate::str::contains("merge"))
            .and(predicate::str::contains("discover")),
    );
}

#[test]
fn test_version_flag() {
    mvrkuma_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mvrkuma"));
}

#[test]
fn test_completions_bash() {
    mvrkuma_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    mvrkuma_cmd().arg("frobnicate").assert().code(2);
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_status_without_server_asks_for_setup() {
    mvrkuma_cmd()
        .arg("status")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn test_config_path_honors_env() {
    mvrkuma_cmd()
        .env("MVRKUMA_CONFIG", "/tmp/mvrkuma-elsewhere.toml")
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/mvrkuma-elsewhere.toml"));
}

#[test]
fn test_config_show_redacts_password() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[server]\nurl = \"http://kuma:3001\"\nusername = \"admin\"\npassword = \"hunter2\"\n\n[monitor]\nkind = \"ping\"\n",
    )
    .unwrap();

    mvrkuma_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("http://kuma:3001")
                .and(predicate::str::contains("kind = \"ping\""))
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[monitor]\nkind = \"carrier-pigeon\"\n").unwrap();

    mvrkuma_cmd()
        .arg("--config")
        .arg(&path)
        .arg("status")
        .assert()
        .failure();
}

// ── Local show-file commands ────────────────────────────────────────

#[test]
fn test_show_lists_fixtures_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let show = write_show(dir.path());

    let output = mvrkuma_cmd()
        .args(["show", "-o", "json"])
        .arg(&show)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = json["fixtures"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Spot 1", "Dark"]);
    assert_eq!(json["tags"].as_array().unwrap().len(), 2);
}

#[test]
fn test_show_plain_prints_fixture_names() {
    let dir = tempfile::tempdir().unwrap();
    let show = write_show(dir.path());

    mvrkuma_cmd()
        .args(["show", "-o", "plain"])
        .arg(&show)
        .assert()
        .success()
        .stdout("Spot 1\nDark\n");
}

#[test]
fn test_show_unreadable_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("bogus.mvr");
    std::fs::write(&bogus, b"not a zip").unwrap();

    mvrkuma_cmd()
        .arg("show")
        .arg(&bogus)
        .assert()
        .code(9);
}

#[test]
fn test_merge_with_itself_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let show = write_show(dir.path());

    mvrkuma_cmd()
        .arg("merge")
        .arg(&show)
        .arg(&show)
        .arg("--out")
        .arg(dir.path().join("out.mvr"))
        .assert()
        .code(2);
}

#[test]
fn test_merge_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let show = write_show(dir.path());
    let scan = dir.path().join("scan.mvr");
    std::fs::copy(&show, &scan).unwrap();
    let out = dir.path().join("merged.mvr");

    mvrkuma_cmd()
        .arg("merge")
        .arg(&show)
        .arg(&scan)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("merged.mvr"));

    let merged = SceneDocument::open(&out).unwrap();
    assert_eq!(merged.fixtures().len(), 2);
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_discover_rejects_zero_timeout() {
    mvrkuma_cmd()
        .args(["discover", "--scan-timeout", "0", "--no-save"])
        .assert()
        .code(2);
}

#[test]
fn test_retag_requires_monitor() {
    mvrkuma_cmd()
        .args(["retag", "--tag", "Stage"])
        .assert()
        .code(2);
}

#[test]
fn test_delete_requires_scope() {
    mvrkuma_cmd().args(["delete", "monitors"]).assert().code(2);
}

#[test]
fn test_delete_without_yes_in_pipe_refuses() {
    configured_cmd()
        .args(["delete", "monitors", "--all"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_import_missing_file_is_parse_error() {
    configured_cmd()
        .args(["import", "/nonexistent/show.mvr"])
        .assert()
        .code(9);
}

#[test]
fn test_tags_create_missing_file_is_parse_error() {
    mvrkuma_cmd()
        .args(["tags", "create", "/nonexistent/show.mvr"])
        .assert()
        .code(9);
}

#[test]
fn test_import_unreachable_server_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let show = write_show(dir.path());

    configured_cmd()
        .args(["--timeout", "2", "import"])
        .arg(&show)
        .assert()
        .code(7);
}
