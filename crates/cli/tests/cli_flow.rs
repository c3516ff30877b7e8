use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

#[allow(deprecated)]
fn fieldsuggest(vault: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fieldsuggest").expect("binary");
    cmd.arg("--vault").arg(vault).arg("--quiet");
    cmd
}

fn run_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("command run");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

fn setup_vault() -> TempDir {
    let temp = tempdir().expect("tempdir");
    let root = temp.path();
    fs::create_dir_all(root.join("people")).expect("create people");
    fs::create_dir_all(root.join("templates")).expect("create templates");
    fs::write(
        root.join("people/ann.md"),
        "---\nrole: editor\n---\nworks with [team:: [[Core]]]\n",
    )
    .expect("write ann");
    fs::write(root.join("people/bob.md"), "role:: reviewer\nstatus:: open\n").expect("write bob");
    fs::write(root.join("templates/person.md"), "role:: {{role}}\n").expect("write template");
    fs::write(
        root.join(".fieldsuggest.toml"),
        "ignored_files = [\"^templates/\"]\nmax_suggestions = 5\n",
    )
    .expect("write settings");
    temp
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v.as_str().expect("string").to_string())
        .collect()
}

#[test]
fn index_prints_stats_and_values() {
    let vault = setup_vault();
    let body = run_json(fieldsuggest(vault.path()).arg("index"));

    assert_eq!(body["stats"]["documents_scanned"], 3);
    assert_eq!(body["stats"]["documents_indexed"], 2);
    assert_eq!(body["stats"]["documents_ignored"], 1);
    assert_eq!(
        strings(&body["values"]),
        vec![
            "role:: editor",
            "team:: [[Core]]",
            "role:: reviewer",
            "status:: open",
        ]
    );
}

#[test]
fn index_stats_only_omits_values() {
    let vault = setup_vault();
    let body = run_json(fieldsuggest(vault.path()).args(["index", "--stats-only"]));
    assert!(body.get("values").is_none());
    assert_eq!(body["stats"]["unique_values"], 4);
}

#[test]
fn explicit_config_overrides_vault_settings() {
    let vault = setup_vault();
    let config = vault.path().join("custom.toml");
    fs::write(&config, "ignored_fields = [\"role\"]\n").expect("write config");

    let body = run_json(
        fieldsuggest(vault.path())
            .arg("--config")
            .arg(&config)
            .arg("index"),
    );
    assert_eq!(
        strings(&body["values"]),
        vec!["team:: [[Core]]", "status:: open"]
    );
}

#[test]
fn suggest_ranks_values_for_the_span() {
    let vault = setup_vault();
    let body = run_json(fieldsuggest(vault.path()).args([
        "suggest",
        "--line",
        "meeting (revi) notes",
        "--cursor",
        "10",
        "--marked",
    ]));

    assert_eq!(body["span"]["query"], "revi");
    assert_eq!(body["span"]["start"], 9);
    assert_eq!(body["span"]["end"], 13);
    let suggestions = body["suggestions"].as_array().expect("suggestions");
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0]["value"], "role:: reviewer");
    assert_eq!(suggestions[0]["marked"], "role:: <mark>revi</mark>ewer");
}

#[test]
fn suggest_outside_a_span_prints_null() {
    let vault = setup_vault();
    let body = run_json(fieldsuggest(vault.path()).args([
        "suggest",
        "--line",
        "plain text",
        "--cursor",
        "3",
    ]));
    assert!(body.is_null());
}

#[test]
fn complete_replaces_the_span() {
    let vault = tempdir().expect("tempdir");
    fieldsuggest(vault.path())
        .args([
            "complete",
            "--line",
            "met [bo] today",
            "--cursor",
            "6",
            "--value",
            "who:: [[Bob]]",
        ])
        .assert()
        .success()
        .stdout("met [who:: [[Bob]]] today\n");
}

#[test]
fn complete_outside_a_span_fails() {
    let vault = tempdir().expect("tempdir");
    fieldsuggest(vault.path())
        .args(["complete", "--line", "nothing", "--cursor", "2", "--value", "x:: y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not inside a trigger span"));
}

#[test]
fn invalid_vault_is_reported() {
    let vault = tempdir().expect("tempdir");
    fieldsuggest(&vault.path().join("missing"))
        .arg("index")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid vault path"));
}
