#![allow(deprecated)] // cargo_bin! macro doesn't exist yet in assert_cmd 2.1

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// A scratch directory holding the drive snapshot for one test.
struct Store {
    dir: TempDir,
}

impl Store {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    fn path(&self) -> PathBuf {
        self.dir.path().join("drive.json")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("drivefs").unwrap();
        cmd.env_remove("DRIVEFS_CONFIG")
            .env_remove("RUST_LOG")
            .arg("--store")
            .arg(self.path());
        cmd
    }

    fn write(&self, path: &str, content: &str) {
        self.cmd()
            .args(["write", path])
            .write_stdin(content)
            .assert()
            .success();
    }
}

#[test]
fn test_help() {
    Command::cargo_bin("drivefs")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("mkdir"))
        .stdout(predicate::str::contains("--store"));
}

#[test]
fn test_read_only_commands_do_not_create_store() {
    let store = Store::new();
    store.cmd().arg("ls").assert().success();
    assert!(!store.path().exists());
}

#[test]
fn test_write_then_cat() {
    let store = Store::new();
    store.cmd().args(["mkdir", "/notes"]).assert().success();
    assert!(store.path().exists());

    store.write("gdrive://notes/today.txt", "hello");
    store
        .cmd()
        .args(["cat", "/notes/today.txt"])
        .assert()
        .success()
        .stdout("hello");
}

#[test]
fn test_write_append() {
    let store = Store::new();
    store.write("/log.txt", "one\n");
    store
        .cmd()
        .args(["write", "--append", "/log.txt"])
        .write_stdin("two\n")
        .assert()
        .success();
    store
        .cmd()
        .args(["cat", "/log.txt"])
        .assert()
        .success()
        .stdout("one\ntwo\n");
}

#[test]
fn test_write_replaces_content() {
    let store = Store::new();
    store.write("/a.txt", "long original");
    store.write("/a.txt", "short");
    store
        .cmd()
        .args(["cat", "/a.txt"])
        .assert()
        .success()
        .stdout("short");
}

#[test]
fn test_write_no_clobber() {
    let store = Store::new();
    store.write("/a.txt", "x");
    store
        .cmd()
        .args(["write", "-n", "/a.txt"])
        .write_stdin("y")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_cat_missing_file() {
    let store = Store::new();
    store
        .cmd()
        .args(["cat", "/nope.txt"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_cat_directory() {
    let store = Store::new();
    store.cmd().args(["mkdir", "/docs"]).assert().success();
    store.cmd().args(["cat", "/docs"]).assert().code(6);
}

#[test]
fn test_mkdir_requires_parents_flag() {
    let store = Store::new();
    store.cmd().args(["mkdir", "/a/b/c"]).assert().code(3);
    store.cmd().args(["mkdir", "-p", "/a/b/c"]).assert().success();
    store
        .cmd()
        .args(["ls", "/a/b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("c/"));
}

#[test]
fn test_ls_json() {
    let store = Store::new();
    store.cmd().args(["mkdir", "/docs"]).assert().success();
    store.write("/docs/readme.md", "# hi");

    let output = store
        .cmd()
        .args(["ls", "--json", "/docs"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["path"], "gdrive://docs");
    assert_eq!(json["entries"][0]["name"], "readme.md");
    assert_eq!(json["entries"][0]["type"], "file");
    assert_eq!(json["entries"][0]["size"], 4);
}

#[test]
fn test_ls_long() {
    let store = Store::new();
    store.write("/data.bin", "12345");
    store
        .cmd()
        .args(["ls", "-l"])
        .assert()
        .success()
        .stdout(predicate::str::contains("data.bin"))
        .stdout(predicate::str::contains("5 B"));
}

#[test]
fn test_rmdir_non_empty() {
    let store = Store::new();
    store.cmd().args(["mkdir", "/docs"]).assert().success();
    store.write("/docs/a.txt", "a");
    store.cmd().args(["rmdir", "/docs"]).assert().code(5);

    store.cmd().args(["rm", "/docs/a.txt"]).assert().success();
    store.cmd().args(["rmdir", "/docs"]).assert().success();
    store.cmd().args(["stat", "/docs"]).assert().code(3);
}

#[test]
fn test_rm_force() {
    let store = Store::new();
    store.cmd().args(["rm", "/ghost"]).assert().code(3);
    store.cmd().args(["rm", "-f", "/ghost"]).assert().success();
}

#[test]
fn test_mv_creates_destination_parent() {
    let store = Store::new();
    store.cmd().args(["mkdir", "/src"]).assert().success();
    store.write("/src/f.txt", "payload");
    store
        .cmd()
        .args(["mv", "/src", "/archive/src"])
        .assert()
        .success();
    store
        .cmd()
        .args(["cat", "/archive/src/f.txt"])
        .assert()
        .success()
        .stdout("payload");
    store.cmd().args(["stat", "/src"]).assert().code(3);
}

#[test]
fn test_stat_json() {
    let store = Store::new();
    store.write("/f.txt", "abc");
    let output = store
        .cmd()
        .args(["stat", "--json", "/f.txt"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["size"], 3);
    assert_eq!(json["mode"], 0o100_600);
    assert_eq!(json["blocks"], -1);
}

#[test]
fn test_touch_creates_and_sets_time() {
    let store = Store::new();
    store
        .cmd()
        .args(["touch", "-t", "2020-01-02T03:04:05Z", "/new.txt"])
        .assert()
        .success();
    store
        .cmd()
        .args(["touch", "-t", "2020-01-02T03:04:05Z", "/new.txt"])
        .assert()
        .success();
    store
        .cmd()
        .args(["stat", "/new.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2020-01-02 03:04:05"));
}

#[test]
fn test_foreign_scheme_is_usage_error() {
    let store = Store::new();
    store.cmd().args(["ls", "s3://bucket"]).assert().code(2);
}

#[test]
fn test_config_scheme() {
    let store = Store::new();
    let config = store.dir.path().join("drivefs.toml");
    std::fs::write(&config, "scheme = \"box\"\n").unwrap();

    store
        .cmd()
        .arg("--config")
        .arg(&config)
        .args(["mkdir", "box://shared"])
        .assert()
        .success();
    store
        .cmd()
        .arg("--config")
        .arg(&config)
        .args(["ls", "--json", "box://"])
        .assert()
        .success()
        .stdout(predicate::str::contains("box://"));
}
