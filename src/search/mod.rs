//! Search Execution and Evidence Caching
//!
//! - [`provider`] - external search backends (Tavily, DuckDuckGo)
//! - [`cache`] - TTL evidence cache keyed by normalized search text
//! - [`dedup`] - Jaccard near-duplicate suppression
//! - [`gateway`] - cache-first provider access
//! - [`budget`] - per-run atomic search budget
//! - [`wave`] - bounded search waves that build per-role evidence

pub mod budget;
pub mod cache;
pub mod dedup;
pub mod gateway;
pub mod provider;
pub mod wave;

pub use budget::{BudgetSnapshot, SearchBudget};
pub use cache::{CacheStats, EvidenceCache};
pub use gateway::{SearchGateway, SearchOutcome};
pub use provider::{DuckDuckGoProvider, SearchProvider, TavilyProvider};
pub use wave::{run_wave, WaveOutcome};
