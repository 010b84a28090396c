//! Search wave executor
//!
//! A wave is one bounded batch of searches issued within a single phase.
//! Slots are decided first, strictly in request order, one budget unit per
//! request. Only then do the granted searches run concurrently.

use crate::search::budget::SearchBudget;
use crate::search::dedup;
use crate::search::gateway::SearchGateway;
use crate::types::{EvidenceContext, Role, SearchRequest};
use futures::future::join_all;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct WaveOutcome {
    /// Evidence for every requested role; skipped roles get an empty context
    pub contexts: HashMap<Role, EvidenceContext>,
    /// Searches that were granted a budget unit
    pub executed: usize,
    pub cache_hits: usize,
    pub failures: usize,
    /// Roles refused a slot because the budget ran out
    pub skipped: Vec<Role>,
}

impl WaveOutcome {
    pub fn context_for(&self, role: Role) -> EvidenceContext {
        self.contexts.get(&role).cloned().unwrap_or_default()
    }

    /// Searches that returned without a provider failure.
    pub fn successful(&self) -> usize {
        self.executed - self.failures
    }
}

pub async fn run_wave(
    gateway: &SearchGateway,
    requests: &[SearchRequest],
    budget: &SearchBudget,
) -> WaveOutcome {
    let mut outcome = WaveOutcome::default();
    let mut granted = Vec::new();

    for request in requests {
        if budget.try_consume() {
            tracing::debug!(role = %request.role, remaining = budget.remaining(), "search slot granted");
            granted.push(request);
        } else {
            outcome.skipped.push(request.role);
            outcome.contexts.insert(request.role, EvidenceContext::empty());
        }
    }

    let searches = granted.iter().map(|request| async move {
        (request.role, gateway.execute(&request.search_text).await)
    });

    for (role, result) in join_all(searches).await {
        outcome.executed += 1;
        if result.cached {
            outcome.cache_hits += 1;
        }
        if result.is_failure() {
            outcome.failures += 1;
        }
        outcome.contexts.insert(role, EvidenceContext::new(result.items));
    }

    if !outcome.skipped.is_empty() {
        tracing::debug!(skipped = ?outcome.skipped, "search budget exhausted");
    }

    outcome
}

/// Append `addition` to `existing` and drop near-duplicates, earlier
/// evidence winning.
pub fn supplement(
    existing: &EvidenceContext,
    addition: &EvidenceContext,
    threshold: f64,
) -> EvidenceContext {
    let combined = existing
        .items()
        .iter()
        .chain(addition.items())
        .cloned()
        .collect();
    EvidenceContext::new(dedup::dedup(combined, threshold))
}
