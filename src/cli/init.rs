//! Init command implementation
//!
//! Writes a commented `prism.toml` with every default spelled out.

use super::output::Output;
use crate::utils::toml_config::{DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_TEMPLATE};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq)]
pub enum InitResult {
    /// prism.toml was written
    Success,
    /// prism.toml already exists and `force` was not set
    AlreadyExists,
    /// An error occurred while writing
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite an existing prism.toml
    pub force: bool,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing prism");

    let config_path = config.path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !config.force {
        output.warning("prism.toml already exists!");
        output.hint("Use --force to overwrite it");
        return InitResult::AlreadyExists;
    }

    if let Err(e) = write_file(&config_path, DEFAULT_CONFIG_TEMPLATE) {
        output.error(&format!("Failed to create {}: {}", DEFAULT_CONFIG_FILE, e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", &config_path.display().to_string());

    output.header("Next Steps");
    output.info("Start Ollama and pull the configured model:");
    output.command("ollama pull llama3.2");
    output.info("Ask a question:");
    output.command("prism run \"Should we adopt AI in our company?\"");

    InitResult::Success
}

fn write_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}
