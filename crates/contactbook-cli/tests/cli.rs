use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
  "authStatus": "authorized",
  "me": {"id": "me-1", "firstName": "Self", "emails": [{"type": "_$!<Home>!$_", "value": "me@example.com"}]},
  "contacts": [
    {
      "id": "c-1",
      "firstName": "Ada",
      "lastName": "Lovelace",
      "emails": [{"type": "_$!<Work>!$_", "value": "ada@example.com"}],
      "phoneNumbers": [{"type": "_$!<Home>!$_", "value": "123-456"}, {"type": "iPhone", "value": ""}],
      "postalAddresses": [{"city": "London"}]
    },
    {"id": "c-2", "organization": "Analytical Engines", "image": "/9j/"}
  ]
}"#;

const VCF: &str = "X-ABUID:v-1\r\nBEGIN:VCARD\r\nVERSION:3.0\r\nN:Hopper;Grace;;;\r\nFN:Grace Hopper\r\nitem1.EMAIL;type=INTERNET;type=pref:grace@example.com\r\nitem1.X-ABLabel:_$!<Other>!$_\r\nTEL;type=CELL;type=VOICE:555-0101\r\nEND:VCARD\r\n";

fn write_file(temp: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = temp.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn run_raw(temp: &TempDir, source: &Path, args: &[&str]) -> Output {
    cargo_bin_cmd!("contactbook")
        .env("XDG_CONFIG_HOME", temp.path())
        .env_remove("RUST_LOG")
        .args(["--source-file", source.to_str().expect("source path")])
        .args(args)
        .output()
        .expect("run command")
}

fn run_cmd(temp: &TempDir, source: &Path, args: &[&str]) -> String {
    let output = run_raw(temp, source, args);
    assert!(output.status.success(), "command failed: {:?}", output);
    String::from_utf8(output.stdout).expect("utf8")
}

fn run_cmd_json(temp: &TempDir, source: &Path, args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = run_raw(temp, source, &full);
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("parse json")
}

#[test]
fn cli_lists_normalized_contacts_from_snapshot() {
    let temp = TempDir::new().expect("temp dir");
    let source = write_file(&temp, "contacts.json", SNAPSHOT);

    let list = run_cmd_json(&temp, &source, &["list"]);
    let items = list.as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["emails"], json!([{"type": "work", "value": "ada@example.com"}]));
    assert_eq!(
        items[0]["phoneNumbers"],
        json!([{"type": "home", "value": "123-456"}, {"type": "iphone", "value": null}])
    );
    assert_eq!(items[0]["image"], Value::Null);
    assert_eq!(items[0]["postalAddresses"][0]["city"], "London");
    assert_eq!(items[1]["emails"], json!([]));
    assert_eq!(items[1]["image"], "/9j/");

    let text = run_cmd(&temp, &source, &["list"]);
    assert!(text.contains("c-1  Ada Lovelace  <ada@example.com>"));
    assert!(text.contains("c-2  Analytical Engines"));
}

#[test]
fn cli_ids_show_and_auth_pass_through() {
    let temp = TempDir::new().expect("temp dir");
    let source = write_file(&temp, "contacts.json", SNAPSHOT);

    let ids = run_cmd_json(&temp, &source, &["ids"]);
    assert_eq!(ids, json!(["c-1", "c-2"]));

    let detail = run_cmd_json(&temp, &source, &["show", "c-1"]);
    assert_eq!(detail["emails"][0]["type"], "_$!<Work>!$_");

    let status = run_cmd_json(&temp, &source, &["auth", "status"]);
    assert_eq!(status["status"], "authorized");
    let text = run_cmd(&temp, &source, &["auth", "request"]);
    assert_eq!(text.trim(), "authorized");
}

#[test]
fn cli_me_handles_present_and_missing_cards() {
    let temp = TempDir::new().expect("temp dir");
    let source = write_file(&temp, "contacts.json", SNAPSHOT);
    let me = run_cmd_json(&temp, &source, &["me"]);
    assert_eq!(me["firstName"], "Self");
    assert_eq!(me["emails"][0]["type"], "home");

    let empty = write_file(&temp, "empty.json", r#"{"contacts": []}"#);
    let me = run_cmd_json(&temp, &empty, &["me"]);
    assert_eq!(me, json!({}));
    let text = run_cmd(&temp, &empty, &["me"]);
    assert!(text.contains("No me card"));
}

#[test]
fn cli_reads_vcf_files() {
    let temp = TempDir::new().expect("temp dir");
    let source = write_file(&temp, "contacts.vcf", VCF);

    let list = run_cmd_json(&temp, &source, &["list"]);
    let items = list.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "v-1");
    assert_eq!(items[0]["firstName"], "Grace");
    assert_eq!(items[0]["displayName"], "Grace Hopper");
    assert_eq!(items[0]["emails"][0]["type"], "other");
    assert_eq!(items[0]["phoneNumbers"][0]["type"], "cell");
}

#[test]
fn cli_uses_source_from_config_file() {
    let temp = TempDir::new().expect("temp dir");
    let source = write_file(&temp, "contacts.json", SNAPSHOT);
    let config = write_file(
        &temp,
        "config.toml",
        &format!(
            "[source]\nkind = \"json\"\npath = {:?}\n",
            source.to_str().expect("source path")
        ),
    );

    let output = cargo_bin_cmd!("contactbook")
        .env("XDG_CONFIG_HOME", temp.path())
        .args(["--config", config.to_str().expect("config path"), "--json", "ids"])
        .output()
        .expect("run command");
    assert!(output.status.success(), "command failed: {:?}", output);
    let ids: Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(ids, json!(["c-1", "c-2"]));
}

#[test]
fn cli_exit_codes() {
    let temp = TempDir::new().expect("temp dir");
    let source = write_file(&temp, "contacts.json", SNAPSHOT);

    let missing = run_raw(&temp, &source, &["show", "nope"]);
    assert_eq!(missing.status.code(), Some(2));

    let unknown = write_file(&temp, "contacts.txt", "");
    let output = run_raw(&temp, &unknown, &["list"]);
    assert_eq!(output.status.code(), Some(3));

    let broken = write_file(
        &temp,
        "broken.json",
        r#"{"contacts": [{"emails": [{"type": 1}]}]}"#,
    );
    let output = run_raw(&temp, &broken, &["list"]);
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("error:"));

    let gone = temp.path().join("gone.json");
    let output = run_raw(&temp, &gone, &["list"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn cli_generates_completions() {
    let output = cargo_bin_cmd!("contactbook")
        .args(["completions", "bash"])
        .output()
        .expect("run command");
    assert!(output.status.success());
    let script = String::from_utf8(output.stdout).expect("utf8");
    assert!(script.contains("contactbook"));
}
