//! Black-box tests of the envlift binary

#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ENVLIFT_VARS: &[&str] = &[
    "ENVLIFT_TOKEN",
    "ENVLIFT_PROJECT",
    "ENVLIFT_CONFIG",
    "ENVLIFT_API_HOST",
    "ENVLIFT_NO_VERIFY_TLS",
    "ENVLIFT_ENCLAVE",
    "ENVLIFT_CONFIG_FILE",
    "ENVLIFT_LOG",
];

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn config_file(&self) -> PathBuf {
        self.dir.path().join("config.json")
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// The binary with an isolated config file and no inherited envlift settings
    fn envlift(&self) -> Command {
        let mut cmd = Command::cargo_bin("envlift").unwrap();
        for var in ENVLIFT_VARS {
            cmd.env_remove(var);
        }
        cmd.arg("--configuration").arg(self.config_file());
        cmd.current_dir(self.dir.path());
        cmd
    }

    fn write_fallback(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

/// An address nothing is listening on
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn set_then_get_plain() {
    let ws = Workspace::new();

    ws.envlift()
        .args(["configure", "set", "project=demo", "config=dev", "--silent"])
        .assert()
        .success()
        .stdout("");

    let stored = read_json(&ws.config_file());
    assert_eq!(stored["/"]["project"], "demo");
    assert_eq!(stored["/"]["config"], "dev");

    ws.envlift()
        .args(["configure", "get", "config", "project", "--plain"])
        .assert()
        .success()
        .stdout("dev\ndemo\n");
}

#[test]
fn get_table_shows_defining_scope() {
    let ws = Workspace::new();
    ws.envlift()
        .args(["--scope", "/srv", "configure", "set", "project", "api", "--silent"])
        .assert()
        .success();

    ws.envlift()
        .args(["--scope", "/srv/app", "configure", "get", "project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project").and(predicate::str::contains("/srv")));
}

#[test]
fn set_prints_inherited_options_with_their_scope() {
    let ws = Workspace::new();
    ws.envlift()
        .args(["configure", "set", "project=demo", "--silent"])
        .assert()
        .success();

    ws.envlift()
        .args(["--scope", "/srv", "configure", "set", "config=dev"])
        .assert()
        .success()
        .stdout(
            predicate::str::is_match(r"(?m)^project\s+demo\s+/$")
                .unwrap()
                .and(predicate::str::is_match(r"(?m)^config\s+dev\s+/srv$").unwrap()),
        );
}

#[test]
fn unknown_option_is_rejected() {
    let ws = Workspace::new();

    ws.envlift()
        .args(["configure", "set", "password=hunter2"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid option 'password'"));
    assert!(!ws.config_file().exists());

    ws.envlift()
        .args(["configure", "get", "password"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid option"));
}

#[test]
fn unset_removes_option() {
    let ws = Workspace::new();
    ws.envlift()
        .args(["configure", "set", "project=demo", "config=dev", "--silent"])
        .assert()
        .success();

    ws.envlift()
        .args(["configure", "unset", "project", "--silent"])
        .assert()
        .success();

    let stored = read_json(&ws.config_file());
    assert!(stored["/"].get("project").is_none());
    assert_eq!(stored["/"]["config"], "dev");
}

#[test]
fn debug_reports_provenance_and_masks_token() {
    let ws = Workspace::new();
    ws.envlift()
        .args(["configure", "set", "project=demo", "token=dp.st.supersecret9876", "--silent"])
        .assert()
        .success();

    ws.envlift()
        .env("ENVLIFT_PROJECT", "web")
        .args(["configure", "debug"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("web")
                .and(predicate::str::contains("environment"))
                .and(predicate::str::contains("9876"))
                .and(predicate::str::contains("supersecret").not())
                .and(predicate::str::contains("https://api.envlift.io"))
                .and(predicate::str::contains("default")),
        );
}

#[test]
fn fallback_only_injects_secrets_without_network() {
    let ws = Workspace::new();
    let fallback = ws.write_fallback(
        "fallback.json",
        r#"{"API_KEY":{"raw":"x","computed":"y"},"PATH":{"raw":"/evil","computed":"/evil"}}"#,
    );

    ws.envlift()
        .args(["run", "--fallback-only", "--fallback"])
        .arg(&fallback)
        .args(["--", "sh", "-c", r#"printf '%s|%s' "$API_KEY" "$PATH""#])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("y|").and(predicate::str::contains("/evil").not()));
}

#[test]
fn fallback_only_with_missing_file_fails() {
    let ws = Workspace::new();

    ws.envlift()
        .args(["run", "--fallback-only", "--fallback"])
        .arg(ws.path("absent.json"))
        .args(["--", "sh", "-c", "echo should-not-run"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("fallback file"));
}

#[test]
fn unreachable_service_degrades_to_fallback() {
    let ws = Workspace::new();
    let fallback = ws.write_fallback("fallback.json", r#"{"API_KEY":{"raw":"x","computed":"y"}}"#);

    ws.envlift()
        .args(["--token", "dp.st.test", "--api-host", &closed_port_url()])
        .args(["run", "--fallback"])
        .arg(&fallback)
        .args(["--", "sh", "-c", r#"printf '%s' "$API_KEY""#])
        .assert()
        .success()
        .stdout("y")
        .stderr(predicate::str::contains("fallback"));

    // The snapshot is left untouched when the fetch failed
    assert_eq!(
        fs::read_to_string(&fallback).unwrap(),
        r#"{"API_KEY":{"raw":"x","computed":"y"}}"#
    );
}

#[test]
fn unreachable_service_without_fallback_fails() {
    let ws = Workspace::new();

    ws.envlift()
        .args(["--token", "dp.st.test", "--api-host", &closed_port_url()])
        .args(["run", "--", "sh", "-c", "echo should-not-run"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("network error"));
}

#[test]
fn missing_token_is_configuration_error() {
    let ws = Workspace::new();

    ws.envlift()
        .args(["run", "--", "true"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("token"));
}

#[test]
fn child_exit_code_is_propagated() {
    let ws = Workspace::new();
    let fallback = ws.write_fallback("fallback.json", "{}");

    ws.envlift()
        .args(["run", "--fallback-only", "--fallback"])
        .arg(&fallback)
        .args(["--", "sh", "-c", "exit 42"])
        .assert()
        .code(42)
        .stderr("");
}

#[test]
fn silent_discards_child_output() {
    let ws = Workspace::new();
    let fallback = ws.write_fallback("fallback.json", "{}");

    ws.envlift()
        .args(["run", "--silent", "--fallback-only", "--fallback"])
        .arg(&fallback)
        .args(["--", "sh", "-c", "echo out; echo err >&2"])
        .assert()
        .success()
        .stdout("")
        .stderr("");
}

#[test]
fn fallback_only_requires_fallback_path() {
    let ws = Workspace::new();

    ws.envlift()
        .args(["run", "--fallback-only", "--", "true"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn empty_fallback_path_is_rejected() {
    let ws = Workspace::new();

    ws.envlift()
        .args(["run", "--fallback", "", "--", "true"])
        .assert()
        .failure()
        .stdout("");
}
