//! Perspective agents
//!
//! Each of the six roles is one call through the uniform [`PerspectiveAgent`]
//! capability. What differs per role is which optional context a
//! [`PerspectiveRequest`] carries:
//!
//! | Role                      | Extra inputs                               |
//! |---------------------------|--------------------------------------------|
//! | white, red, yellow, black | none                                       |
//! | green                     | [`AggregatedContext`]                      |
//! | blue                      | all five prior results, [`SynthesisContext`] |
//!
//! [`PerspectiveRunner`] wraps a call with the per-role timeout and turns
//! every failure into a `Failed` [`PerspectiveResult`].

pub mod llm;
pub mod runner;

pub use llm::LlmPerspective;
pub use runner::PerspectiveRunner;

use crate::pipeline::aggregator::{AggregatedContext, SynthesisContext};
use crate::types::{AppError, EvidenceContext, PerspectiveResult, Result, Role};
use async_trait::async_trait;

/// Produces the payload text for one role.
#[async_trait]
pub trait PerspectiveAgent: Send + Sync {
    async fn invoke(&self, request: &PerspectiveRequest) -> Result<String>;
}

/// Everything a role is given for one invocation.
#[derive(Debug, Clone)]
pub struct PerspectiveRequest {
    pub role: Role,
    pub query: String,
    pub evidence: EvidenceContext,
    pub aggregated: Option<AggregatedContext>,
    pub prior_results: Vec<PerspectiveResult>,
    pub synthesis: Option<SynthesisContext>,
}

impl PerspectiveRequest {
    /// Request for one of the four Phase 1 roles.
    pub fn parallel(role: Role, query: impl Into<String>, evidence: EvidenceContext) -> Result<Self> {
        if !role.is_parallel() {
            return Err(AppError::InvariantViolation(format!(
                "{} is not a parallel role",
                role
            )));
        }
        Ok(Self {
            role,
            query: query.into(),
            evidence,
            aggregated: None,
            prior_results: Vec::new(),
            synthesis: None,
        })
    }

    /// Request for the creativity role.
    pub fn creative(
        query: impl Into<String>,
        aggregated: AggregatedContext,
        evidence: EvidenceContext,
    ) -> Self {
        Self {
            role: Role::Green,
            query: query.into(),
            evidence,
            aggregated: Some(aggregated),
            prior_results: Vec::new(),
            synthesis: None,
        }
    }

    /// Request for the synthesis role.
    pub fn synthesis(
        query: impl Into<String>,
        prior_results: Vec<PerspectiveResult>,
        synthesis: SynthesisContext,
        evidence: EvidenceContext,
    ) -> Self {
        Self {
            role: Role::Blue,
            query: query.into(),
            evidence,
            aggregated: None,
            prior_results,
            synthesis: Some(synthesis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_rejects_sequential_roles() {
        assert!(PerspectiveRequest::parallel(Role::White, "q", EvidenceContext::empty()).is_ok());
        let err = PerspectiveRequest::parallel(Role::Green, "q", EvidenceContext::empty()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_constructors_set_role_specific_inputs() {
        let green = PerspectiveRequest::creative("q", AggregatedContext::default(), EvidenceContext::empty());
        assert_eq!(green.role, Role::Green);
        assert!(green.aggregated.is_some());
        assert!(green.synthesis.is_none());

        let prior = vec![PerspectiveResult::ok(Role::White, "facts".to_string(), 1, 0)];
        let blue = PerspectiveRequest::synthesis("q", prior, SynthesisContext::default(), EvidenceContext::empty());
        assert_eq!(blue.role, Role::Blue);
        assert_eq!(blue.prior_results.len(), 1);
        assert!(blue.aggregated.is_none());
    }
}
