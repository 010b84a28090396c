//! # prism - phased perspective orchestrator
//!
//! Analyzes a question from six thinking roles, each backed by web evidence,
//! under a hard cap on the number of searches a run may issue.
//!
//! ## Overview
//!
//! prism can be used in two ways:
//!
//! 1. **As a CLI** - Run the `prism` binary
//! 2. **As a library** - Drive an [`Orchestrator`] from your own code
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use prism::{Orchestrator, PrismConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PrismConfig::load_or_default(None)?;
//!     let orchestrator = Orchestrator::from_config(&config)?;
//!
//!     let report = orchestrator.run("Should we adopt AI in our company?", 4).await;
//!     for (role, result) in &report.results {
//!         println!("{}: {:?}", role, result.payload);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Phases
//!
//! | Phase | Work |
//! |-------|------|
//! | 0 | Classify the query, allocate search slots, run the first wave |
//! | 1 | white, red, yellow and black in parallel |
//! | 2 | Aggregate Phase 1, optional search, green |
//! | 3 | Optional search, blue over all five prior results |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ollama` | Ollama local inference (default) |
//! | `openai` | OpenAI API and compatible endpoints |
//!
//! ## Modules
//!
//! - [`analysis`] - Query classification and search allocation
//! - [`search`] - Provider, cache, budget, dedup and waves
//! - [`perspectives`] - Role agents and the timeout runner
//! - [`pipeline`] - State machine, aggregation and events
//! - [`llm`] - LLM client implementations
//! - [`types`] - Common types and error handling

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Query classification and search budget allocation.
pub mod analysis;
/// Command-line parsing and terminal output.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Perspective agents and the runner that bounds them.
pub mod perspectives;
/// Phase state machine, aggregation and run reports.
pub mod pipeline;
/// Search provider, evidence cache, budget and waves.
pub mod search;
/// Core types (queries, evidence, results, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use analysis::{classify_and_allocate, QueryAnalysis};
pub use llm::{LLMClient, Provider};
pub use perspectives::{LlmPerspective, PerspectiveAgent, PerspectiveRequest, PerspectiveRunner};
pub use pipeline::{Orchestrator, PipelineEvent, PipelineSettings, RunReport, RunStatus};
pub use search::{EvidenceCache, SearchBudget, SearchGateway, SearchProvider};
pub use types::{AppError, Result, Role};
pub use utils::toml_config::{ConfigManager, PrismConfig};
