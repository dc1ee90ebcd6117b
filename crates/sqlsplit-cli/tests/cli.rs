use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("sqlsplit-syntax")
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Command with a config path that does not exist, so the user's own config
/// never leaks into a test.
fn sqlsplit(config_dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sqlsplit");
    cmd.arg("--config").arg(config_dir.path().join("config.toml"));
    cmd
}

#[test]
fn splits_file_as_text() {
    let dir = TempDir::new().unwrap();
    sqlsplit(&dir)
        .arg(fixture_path("mysql_procedures.sql"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("-- statement 1\nCREATE TABLE audit")
                .and(predicate::str::contains("-- statement 4\nCALL log_msg('done');"))
                .and(predicate::str::contains("-- statement 5").not())
                .and(predicate::str::contains("DELIMITER //").not()),
        );
}

#[test]
fn reads_stdin_as_json() {
    let dir = TempDir::new().unwrap();
    let output = sqlsplit(&dir)
        .args(["--format", "json"])
        .write_stdin("SELECT 'a;b'; SELECT 2;")
        .output()
        .unwrap();

    assert!(output.status.success());
    let statements: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(statements, vec!["SELECT 'a;b';", " SELECT 2;"]);
}

#[test]
fn annotated_mode_marks_atomic_blocks() {
    let dir = TempDir::new().unwrap();
    sqlsplit(&dir)
        .arg("--annotated")
        .arg(fixture_path("goose_annotated.sql"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("-- block 2 (atomic)\n-- +goose StatementBegin")
                .and(predicate::str::contains("-- block 3\nDROP TABLE IF EXISTS old_t;")),
        );
}

#[test]
fn prefix_comes_from_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "marker_prefix = \"migrate\"\n").unwrap();

    sqlsplit(&dir)
        .args(["--annotated", "-"])
        .write_stdin("-- +migrate StatementBegin\nA; B;\n-- +migrate StatementEnd\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("-- block 1 (atomic)\n"));
}

#[test]
fn prefix_flag_overrides_config() {
    let dir = TempDir::new().unwrap();
    sqlsplit(&dir)
        .args(["--annotated", "--prefix", "dbmate"])
        .write_stdin("-- +goose StatementBegin\nA;\n-- +goose StatementEnd\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("-- block 1\n"));
}

#[test]
fn missing_file_fails() {
    let dir = TempDir::new().unwrap();
    sqlsplit(&dir)
        .arg(dir.path().join("nope.sql"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open"));
}

#[test]
fn invalid_utf8_fails() {
    let dir = TempDir::new().unwrap();
    sqlsplit(&dir)
        .write_stdin(vec![b'S', 0xff, b';'])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid UTF-8"));
}
