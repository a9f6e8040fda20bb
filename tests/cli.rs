//! Integration tests for the cirrus-query command line.

use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::OnceLock;

static FIXTURE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Get or create the config fixture directory (singleton)
fn fixture_dir() -> PathBuf {
    FIXTURE_DIR.get_or_init(create_fixture_dir).clone()
}

/// Host and sister wiki configs
fn create_fixture_dir() -> PathBuf {
    let dir = std::env::temp_dir()
        .join("cirrus_query_cli_tests")
        .join(format!("test_{}", std::process::id()));

    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("Failed to create fixture dir");

    fs::write(
        dir.join("host.json"),
        r#"{
    "wiki_id": "enwiki",
    "enable_cross_project_search": true,
    "enable_alt_language": true,
    "num_cross_project_search_results": 3
}
"#,
    )
    .unwrap();

    fs::write(
        dir.join("sister.json"),
        r#"{
    "wiki_id": "enwiktionary"
}
"#,
    )
    .unwrap();

    fs::write(dir.join("broken.json"), "{ not json").unwrap();

    dir
}

fn cirrus_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_cirrus-query"))
}

/// Run the binary with the host config, returns (stdout, stderr, success)
fn run(args: &[&str]) -> (String, String, bool) {
    let host = fixture_dir().join("host.json");
    let output = Command::new(cirrus_binary())
        .arg("--config")
        .arg(&host)
        .args(args)
        .output()
        .expect("Failed to run cirrus-query");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn run_json(args: &[&str]) -> Value {
    let (stdout, stderr, success) = run(args);
    assert!(success, "command failed: {:?}\nstderr: {}", args, stderr);
    serde_json::from_str(&stdout).expect("stdout should be JSON")
}

#[test]
fn test_explain_simple_query() {
    let out = run_json(&["explain", "hello", "world"]);
    assert_eq!(out["wiki"], "enwiki");
    assert_eq!(out["raw_query"], "hello world");
    assert_eq!(out["namespaces"], serde_json::json!([0]));
    assert_eq!(out["limit"], 10);
    assert_eq!(out["cross_search_strategy"]["cross_project"], true);
}

#[test]
fn test_explain_options() {
    let out = run_json(&[
        "explain",
        "-n",
        "0,12",
        "--limit",
        "50",
        "--sort",
        "size",
        "--profile",
        "rescore=empty",
        "--no-cross-language",
        "hello",
    ]);
    assert_eq!(out["namespaces"], serde_json::json!([0, 12]));
    assert_eq!(out["limit"], 50);
    assert_eq!(out["sort"], "size");
    assert_eq!(out["forced_profiles"]["rescore"], "empty");
    assert_eq!(out["cross_search_strategy"]["cross_language"], false);
    assert_eq!(out["cross_search_strategy"]["cross_project"], true);
}

#[test]
fn test_explain_local_keyword() {
    let out = run_json(&["explain", "local:hello"]);
    assert_eq!(out["cross_search_strategy"]["cross_project"], false);
    assert_eq!(out["cross_search_strategy"]["cross_language"], false);
    assert_eq!(out["initial_cross_search_strategy"]["cross_project"], true);
}

#[test]
fn test_explain_prefix_filter() {
    let out = run_json(&["explain", "--prefix", "Help:Con", "hello"]);
    assert_eq!(out["namespaces"], serde_json::json!([0, 12]));
    assert_eq!(out["contextual_filters"], serde_json::json!(["prefix"]));
    assert_eq!(out["cross_search_strategy"]["cross_project"], false);
}

#[test]
fn test_context_output() {
    let out = run_json(&["context", "--no-extra-indices", "hello"]);
    assert_eq!(out["search_type"], "simple_bag_of_words");
    assert_eq!(out["rescore_profile"], "classic");
    assert_eq!(out["limit_search_to_local_wiki"], true);
}

#[test]
fn test_cross_wiki_derivation() {
    let sister = fixture_dir().join("sister.json");
    let out = run_json(&[
        "cross-wiki",
        "--target-config",
        sister.to_str().unwrap(),
        "--offset",
        "20",
        "hello",
    ]);
    assert_eq!(out["source"]["offset"], 20);
    assert_eq!(out["derived"]["wiki"], "enwiktionary");
    assert_eq!(out["derived"]["offset"], 0);
    assert_eq!(out["derived"]["limit"], 3);
    assert_eq!(out["derived"]["with_dym_suggestion"], false);
}

#[test]
fn test_cross_language_derivation_keeps_paging() {
    let sister = fixture_dir().join("sister.json");
    let out = run_json(&[
        "cross-wiki",
        "--language",
        "--target-config",
        sister.to_str().unwrap(),
        "--offset",
        "20",
        "hello",
    ]);
    assert_eq!(out["derived"]["offset"], 20);
    assert_eq!(out["derived"]["limit"], 10);
}

#[test]
fn test_cross_wiki_rejected_for_local_query() {
    let sister = fixture_dir().join("sister.json");
    let (_, stderr, success) = run(&[
        "cross-wiki",
        "--target-config",
        sister.to_str().unwrap(),
        "local:hello",
    ]);
    assert!(!success);
    assert!(stderr.contains("cross-project"), "stderr: {}", stderr);
}

#[test]
fn test_rewrite() {
    let out = run_json(&["rewrite", "--to", "hello world", "--allow-rewrite", "helo wrld"]);
    assert_eq!(out["source"]["raw_query"], "helo wrld");
    assert_eq!(out["rewritten"]["raw_query"], "hello world");
    assert_eq!(out["rewritten"]["allow_rewrite"], false);

    let (_, _, success) = run(&["rewrite", "--to", "hello world", "helo wrld"]);
    assert!(!success, "rewrite must be allowed by the source query");
}

#[test]
fn test_config_show_and_save() {
    let out = run_json(&["config"]);
    assert_eq!(out["wiki_id"], "enwiki");
    assert_eq!(out["num_cross_project_search_results"], 3);

    let saved = fixture_dir().join("saved.json");
    let output = Command::new(cirrus_binary())
        .env("CIRRUS_QUERY_CONFIG", &saved)
        .args(["config", "--save"])
        .output()
        .expect("Failed to run cirrus-query");
    assert!(output.status.success());
    let content = fs::read_to_string(&saved).unwrap();
    let value: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["wiki_id"], "local");
}

#[test]
fn test_invalid_config_file() {
    let broken = fixture_dir().join("broken.json");
    let output = Command::new(cirrus_binary())
        .arg("--config")
        .arg(&broken)
        .args(["explain", "hello"])
        .output()
        .expect("Failed to run cirrus-query");
    assert!(!output.status.success());

    let (_, stderr, success) = run(&["explain", "--profile", "bogus=x", "hello"]);
    assert!(!success);
    assert!(stderr.contains("unknown profile type"), "stderr: {}", stderr);
}
