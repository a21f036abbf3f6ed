#![deny(clippy::all, clippy::pedantic)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn command(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("elm-static-html"));
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("ELM_STATIC_HTML_SETTINGS_FILE");
    cmd
}

#[test]
fn missing_filename_prints_usage_and_fails() {
    let dir = TempDir::new().expect("tempdir");

    command(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(contains("no filename provided"))
        .stderr(contains("Usage"));
}

#[test]
fn init_config_writes_example_file() {
    let dir = TempDir::new().expect("tempdir");

    command(dir.path()).arg("--init-config").assert().success();

    let written = fs::read_to_string(dir.path().join("elm-static-html.json")).expect("config");
    assert_eq!(written, "{\n    \"files\": {}\n}\n");
}

#[test]
fn missing_manifest_fails_before_compiling() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("Main.elm"), "module Main exposing (view)\n").expect("source");

    command(dir.path())
        .args(["-f", "Main.elm"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(contains("elm-package.json"));

    assert!(!dir.path().join(".elm-static-html").exists());
}

#[test]
fn missing_config_file_suggests_init_config() {
    let dir = TempDir::new().expect("tempdir");

    command(dir.path())
        .args(["-c", "elm-static-html.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("--init-config"));
}

#[test]
fn malformed_config_file_fails() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("elm-static-html.json"),
        r#"{ "files": { "Main.elm": 42 } }"#,
    )
    .expect("config");

    command(dir.path())
        .args(["--config", "elm-static-html.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Main.elm"))
        .stderr(contains("Usage"));
}

#[test]
fn config_file_without_files_key_fails() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("elm-static-html.json"),
        r#"{ "file": { "Main.elm": "index.html" } }"#,
    )
    .expect("config");

    command(dir.path())
        .args(["-c", "elm-static-html.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("unknown field"));

    assert!(!dir.path().join(".elm-static-html").exists());
}

#[test]
fn empty_output_flag_fails() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("Main.elm"), "module Main exposing (view)\n").expect("source");

    command(dir.path())
        .args(["-f", "Main.elm", "-o", ""])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("must not be empty"));
}

#[test]
fn invalid_log_level_is_a_configuration_error() {
    let dir = TempDir::new().expect("tempdir");

    command(dir.path())
        .args(["-f", "Main.elm", "--log-level", "loud"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("logging.level"));
}
