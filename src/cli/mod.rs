//! CLI module for prism
//!
//! Provides command-line parsing for the `prism` binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// prism - phased perspective orchestrator
///
/// Analyzes a question from six thinking roles, backed by a bounded number of
/// web searches shared across the run.
#[derive(Parser, Debug)]
#[command(
    name = "prism",
    version,
    about = "prism - phased perspective orchestrator",
    long_about = "Runs a question through six thinking roles in four phases:\n\
                  facts, reactions, benefits and risks in parallel, then creativity,\n\
                  then synthesis. Web searches are capped per run and cached.",
    after_help = "EXAMPLES:\n    \
                  prism init                               # Write prism.toml\n    \
                  prism run \"Should we adopt AI?\"          # Run with the configured ceiling\n    \
                  prism run --ceiling 2 --json \"...\"       # Two searches, JSON report\n    \
                  prism config --validate                  # Check prism.toml"
)]
pub struct Cli {
    /// Path to the configuration file (defaults to ./prism.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a query through all six perspectives
    Run {
        /// The question to analyze
        query: String,

        /// Maximum number of searches for this run (overrides config)
        #[arg(long)]
        ceiling: Option<usize>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Print phase and perspective events as they happen
        #[arg(long)]
        stream: bool,
    },

    /// Show the effective configuration
    Config {
        /// Only validate, print nothing on success
        #[arg(long)]
        validate: bool,
    },

    /// Write a default prism.toml
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing prism.toml
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
