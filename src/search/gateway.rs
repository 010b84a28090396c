use crate::search::cache::EvidenceCache;
use crate::search::dedup;
use crate::search::provider::SearchProvider;
use crate::types::{normalize_text, ResultItem};
use std::sync::Arc;

/// Result of one gateway call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    pub items: Vec<ResultItem>,
    /// Served from the evidence cache without a provider call
    pub cached: bool,
    /// Set when the provider failed; `items` is empty in that case
    pub failure: Option<String>,
}

impl SearchOutcome {
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Cache-first access to a search provider.
///
/// On a miss the gateway makes exactly one provider call, drops
/// near-duplicates from the response, stores what is left and returns it.
/// Provider failures come back as an empty outcome with a reason and are
/// never cached.
#[derive(Clone)]
pub struct SearchGateway {
    provider: Arc<dyn SearchProvider>,
    cache: Arc<EvidenceCache>,
    duplicate_threshold: f64,
    max_results: usize,
}

impl SearchGateway {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        cache: Arc<EvidenceCache>,
        duplicate_threshold: f64,
        max_results: usize,
    ) -> Self {
        Self {
            provider,
            cache,
            duplicate_threshold,
            max_results,
        }
    }

    pub fn cache(&self) -> &Arc<EvidenceCache> {
        &self.cache
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn execute(&self, search_text: &str) -> SearchOutcome {
        let key = normalize_text(search_text);

        if let Some(items) = self.cache.lookup(&key) {
            tracing::debug!(search = %key, items = items.len(), "evidence cache hit");
            return SearchOutcome {
                items,
                cached: true,
                failure: None,
            };
        }

        match self.provider.search(search_text, self.max_results).await {
            Ok(items) => {
                let returned = items.len();
                let items = dedup::dedup(items, self.duplicate_threshold);
                tracing::debug!(
                    search = %key,
                    returned,
                    kept = items.len(),
                    "provider search completed"
                );
                self.cache.store(&key, items.clone());
                SearchOutcome {
                    items,
                    cached: false,
                    failure: None,
                }
            }
            Err(e) => {
                tracing::warn!(search = %key, error = %e, "search provider failed");
                SearchOutcome {
                    items: Vec::new(),
                    cached: false,
                    failure: Some(e.to_string()),
                }
            }
        }
    }
}
