//! Mock implementations for testing.
//!
//! Scripted search providers and perspective agents shared by the
//! integration tests, so no test touches the network or a model server.

use async_trait::async_trait;
use parking_lot::Mutex;
use prism::perspectives::{PerspectiveAgent, PerspectiveRequest};
use prism::search::SearchProvider;
use prism::types::{AppError, ResultItem, Result, Role};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Search provider that answers every query with one result echoing the
/// query text, or fails every call.
///
/// # Examples
///
/// ```ignore
/// let provider = ScriptedSearchProvider::succeeding();
/// let calls = provider.call_counter();
/// ```
#[derive(Clone)]
pub struct ScriptedSearchProvider {
    should_fail: bool,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSearchProvider {
    /// Create a provider that always returns one result.
    pub fn succeeding() -> Self {
        Self {
            should_fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a provider that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared handle on the number of provider calls made so far.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearchProvider {
    async fn search(&self, query: &str, _max_results: usize) -> Result<Vec<ResultItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            return Err(AppError::Provider("Mock search failure".to_string()));
        }
        Ok(vec![ResultItem::new(
            format!("Result for {}", query),
            query,
            format!("https://example.com/{}", query.len()),
        )])
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// How a scripted role behaves when invoked.
#[derive(Debug, Clone, Copy)]
pub enum RoleScript {
    Answer,
    Fail,
    Sleep(Duration),
    Blank,
}

/// Perspective agent with per-role scripted behavior.
///
/// Roles answer with `"<role> view of <query>"` unless scripted otherwise.
/// The synthesis role answers with every live prior payload joined by
/// `" | "`, so tests can check what it was given. Every request is recorded.
#[derive(Clone, Default)]
pub struct ScriptedPerspective {
    scripts: HashMap<Role, RoleScript>,
    requests: Arc<Mutex<Vec<PerspectiveRequest>>>,
}

impl ScriptedPerspective {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override how `role` behaves.
    pub fn with(mut self, role: Role, script: RoleScript) -> Self {
        self.scripts.insert(role, script);
        self
    }

    /// Shared handle on every request received so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<PerspectiveRequest>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl PerspectiveAgent for ScriptedPerspective {
    async fn invoke(&self, request: &PerspectiveRequest) -> Result<String> {
        self.requests.lock().push(request.clone());

        match self.scripts.get(&request.role).copied().unwrap_or(RoleScript::Answer) {
            RoleScript::Fail => {
                return Err(AppError::LLM(format!("{} refused", request.role)));
            }
            RoleScript::Blank => return Ok("   ".to_string()),
            RoleScript::Sleep(delay) => tokio::time::sleep(delay).await,
            RoleScript::Answer => {}
        }

        if request.role == Role::Blue {
            let joined = request
                .prior_results
                .iter()
                .filter_map(|r| r.live_payload())
                .collect::<Vec<_>>()
                .join(" | ");
            return Ok(format!("synthesis of: {}", joined));
        }

        Ok(format!("{} view of {}", request.role, request.query))
    }
}
