//! Query Classification and Search Budget Allocation
//!
//! The first thing a run does is look at the raw query:
//!
//! 1. Label its topic and complexity with lexical rules ([`classifier`])
//! 2. Give every role a search priority ([`allocator::assign_priorities`])
//! 3. Hand out the run's search slots greedily by priority ([`allocator::allocate`])
//! 4. Build a role-specific search text for each granted slot
//!
//! Nothing here can fail; every string, including the empty one, classifies.
//!
//! # Example
//!
//! ```ignore
//! let analysis = classify_and_allocate(&Query::new("Should we adopt AI in our company?"), 4);
//! assert_eq!(analysis.topic, TopicLabel::Business);
//! assert_eq!(analysis.allocation[0].role, Role::White);
//! ```

pub mod allocator;
pub mod classifier;

pub use allocator::RolePriorities;

use crate::types::{Complexity, Query, QueryKind, Role, SearchRequest, TopicLabel};
use classifier::LexicalView;
use serde::{Deserialize, Serialize};

/// Outcome of classifying a query and allocating its search budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub topic: TopicLabel,
    pub complexity: Complexity,
    pub kind: QueryKind,
    pub priorities: RolePriorities,
    /// Granted searches, in the order they must be issued
    pub allocation: Vec<SearchRequest>,
    pub rationale: String,
}

impl QueryAnalysis {
    pub fn is_granted(&self, role: Role) -> bool {
        self.allocation.iter().any(|r| r.role == role)
    }

    pub fn request_for(&self, role: Role) -> Option<&SearchRequest> {
        self.allocation.iter().find(|r| r.role == role)
    }
}

/// Classify `query` and distribute `ceiling` search slots across the roles.
pub fn classify_and_allocate(query: &Query, ceiling: usize) -> QueryAnalysis {
    let view = LexicalView::new(&query.normalized);
    let topic = classifier::classify_topic(&view);
    let complexity = classifier::classify_complexity(&view);
    let kind = classifier::classify_kind(&view);
    let priorities = allocator::assign_priorities(&view, topic, complexity);
    let granted = allocator::allocate(&priorities, ceiling);
    let allocation = allocator::build_requests(&query.raw, topic, &granted);
    let rationale = build_rationale(topic, complexity, kind, &priorities, &granted);

    tracing::debug!(%topic, %complexity, %kind, slots = granted.len(), "query classified");

    QueryAnalysis {
        topic,
        complexity,
        kind,
        priorities,
        allocation,
        rationale,
    }
}

fn build_rationale(
    topic: TopicLabel,
    complexity: Complexity,
    kind: QueryKind,
    priorities: &RolePriorities,
    granted: &[Role],
) -> String {
    let mut rationale = format!(
        "Query classified as {} complexity, {} topic, {} query. Search budget allocated to {} roles",
        complexity,
        topic,
        kind,
        granted.len()
    );
    if granted.is_empty() {
        rationale.push('.');
        return rationale;
    }
    let roles = granted
        .iter()
        .map(|role| format!("{} ({}, {})", role, role.focus(), priorities.get(*role)))
        .collect::<Vec<_>>()
        .join(", ");
    rationale.push_str(": ");
    rationale.push_str(&roles);
    rationale.push('.');
    rationale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;

    #[test]
    fn test_business_query_allocation() {
        let analysis = classify_and_allocate(&Query::new("Should we adopt AI in our company?"), 4);
        assert_eq!(analysis.topic, TopicLabel::Business);
        assert_eq!(analysis.allocation.len(), 4);
        assert_eq!(analysis.allocation[0].role, Role::White);
        assert_eq!(analysis.allocation[1].role, Role::Yellow);
        assert_eq!(analysis.priorities.get(Role::Yellow), Priority::High);
        assert!(analysis.allocation[0].search_text.starts_with("Should we adopt AI"));
    }

    #[test]
    fn test_zero_ceiling_grants_nothing() {
        let analysis = classify_and_allocate(&Query::new("anything"), 0);
        assert!(analysis.allocation.is_empty());
        assert!(analysis.rationale.ends_with("0 roles."));
    }

    #[test]
    fn test_empty_query_classifies() {
        let analysis = classify_and_allocate(&Query::new(""), 4);
        assert_eq!(analysis.topic, TopicLabel::General);
        assert_eq!(analysis.complexity, Complexity::Simple);
        assert_eq!(analysis.allocation.len(), 4);
    }

    #[test]
    fn test_allocation_has_no_duplicate_roles() {
        let analysis = classify_and_allocate(&Query::new("creative risk of feelings in business"), 10);
        let mut roles: Vec<Role> = analysis.allocation.iter().map(|r| r.role).collect();
        roles.sort();
        roles.dedup();
        assert_eq!(roles.len(), analysis.allocation.len());
        assert_eq!(roles.len(), 6);
    }

    #[test]
    fn test_rationale_lists_granted_roles() {
        let analysis = classify_and_allocate(&Query::new("Should we adopt AI in our company?"), 2);
        assert_eq!(analysis.kind, QueryKind::Recommendation);
        assert!(analysis.rationale.contains("business topic, recommendation query"));
        assert!(analysis.rationale.contains("white (facts, critical)"));
        assert!(analysis.rationale.contains("yellow (optimism, high)"));
        assert!(analysis.is_granted(Role::Yellow));
        assert!(!analysis.is_granted(Role::Red));
    }
}
