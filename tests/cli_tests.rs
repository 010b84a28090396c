//! CLI integration tests for prism
//!
//! Drives the built `prism` binary: config discovery and validation, the init
//! command and a JSON run that needs no network.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run the prism binary with `args` inside `working_dir`.
fn run_prism(args: &[&str], working_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_prism"))
        .arg("--no-color")
        .args(args)
        .current_dir(working_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute prism")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// =============================================================================
// Help Tests
// =============================================================================

#[test]
fn test_help_lists_commands() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_prism(&["--help"], temp_dir.path());

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("config"));
    assert!(stdout.contains("init"));
}

// =============================================================================
// Init Command Tests
// =============================================================================

#[test]
fn test_init_writes_template() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_prism(&["init"], temp_dir.path());

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let content = fs::read_to_string(temp_dir.path().join("prism.toml"))
        .expect("prism.toml should exist");
    assert_eq!(content, prism::utils::toml_config::DEFAULT_CONFIG_TEMPLATE);
    assert!(stdout(&output).contains("prism.toml"));
}

#[test]
fn test_init_into_nested_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = run_prism(&["init", "project/conf"], temp_dir.path());

    assert!(output.status.success());
    assert!(temp_dir.path().join("project/conf/prism.toml").exists());
}

#[test]
fn test_init_refuses_overwrite_without_force() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("prism.toml");
    fs::write(&config_path, "[search]\nceiling = 1\n").unwrap();

    let output = run_prism(&["init"], temp_dir.path());

    assert!(!output.status.success());
    assert!(stdout(&output).contains("already exists"));
    assert_eq!(
        fs::read_to_string(&config_path).unwrap(),
        "[search]\nceiling = 1\n"
    );
}

#[test]
fn test_init_force_overwrites() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("prism.toml");
    fs::write(&config_path, "[search]\nceiling = 1\n").unwrap();

    let output = run_prism(&["init", "--force"], temp_dir.path());

    assert!(output.status.success());
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("ceiling = 4"));
}

// =============================================================================
// Config Command Tests
// =============================================================================

#[test]
fn test_config_uses_explicit_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("custom.toml"), "[search]\nceiling = 2\n").unwrap();
    // Ignored in favour of --config
    fs::write(temp_dir.path().join("prism.toml"), "[search]\nceiling = 7\n").unwrap();

    let output = run_prism(&["--config", "custom.toml", "config"], temp_dir.path());

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.contains("custom.toml"));
    assert!(stdout.contains("ceiling = 2"));
    assert!(!stdout.contains("ceiling = 7"));
}

#[test]
fn test_config_falls_back_to_prism_toml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp_dir.path().join("prism.toml"), "[search]\nceiling = 7\n").unwrap();

    let output = run_prism(&["config"], temp_dir.path());

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.contains("prism.toml"));
    assert!(stdout.contains("ceiling = 7"));
}

#[test]
fn test_config_without_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = run_prism(&["config"], temp_dir.path());

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let stdout = stdout(&output);
    assert!(stdout.contains("built-in defaults"));
    assert!(stdout.contains("ceiling = 4"));
    assert!(stdout.contains("model = \"llama3.2\""));
}

#[test]
fn test_config_validate_accepts_template() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    assert!(run_prism(&["init"], temp_dir.path()).status.success());

    let output = run_prism(&["config", "--validate"], temp_dir.path());

    assert!(output.status.success());
    assert!(stdout(&output).contains("configuration is valid"));
}

#[test]
fn test_config_validate_rejects_bad_search_section() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        temp_dir.path().join("prism.toml"),
        "[search]\nduplicate_threshold = 1.5\n",
    )
    .unwrap();

    let output = run_prism(&["config", "--validate"], temp_dir.path());

    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("duplicate_threshold"), "stderr: {}", stderr);
    assert!(!stdout(&output).contains("configuration is valid"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = run_prism(&["--config", "nowhere.toml", "config"], temp_dir.path());

    assert!(!output.status.success());
    assert!(stderr(&output).contains("nowhere.toml"));
}

// =============================================================================
// Run Command Tests
// =============================================================================

/// Zero ceiling means no search calls; the LLM endpoint refuses connections,
/// so every role fails fast and the run still completes.
#[cfg(feature = "ollama")]
#[test]
fn test_run_json_without_network() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        temp_dir.path().join("prism.toml"),
        r#"
[perspectives]
timeout_secs = 2

[llm]
provider = "ollama"
base_url = "http://127.0.0.1:9"
"#,
    )
    .unwrap();

    let output = run_prism(
        &["run", "--json", "--ceiling", "0", "Should we adopt AI in our company?"],
        temp_dir.path(),
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("stdout should be a JSON report");

    assert_eq!(report["status"], "done");
    assert_eq!(report["query"], "Should we adopt AI in our company?");
    assert_eq!(report["analysis"]["topic"], "business");
    assert_eq!(report["analysis"]["kind"], "recommendation");
    assert_eq!(report["analysis"]["allocation"].as_array().unwrap().len(), 0);

    let results = report["results"].as_object().unwrap();
    assert_eq!(results.len(), 6);
    for role in ["white", "red", "yellow", "black", "green", "blue"] {
        assert_eq!(results[role]["status"], "failed", "{}", role);
    }

    assert_eq!(report["statistics"]["searches_executed"], 0);
    assert_eq!(report["statistics"]["perspectives_failed"], 6);
    assert_eq!(report["statistics"]["budget"]["ceiling"], 0);
    assert_eq!(report["statistics"]["phases"].as_array().unwrap().len(), 4);
}
