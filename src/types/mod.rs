use serde::{Deserialize, Serialize};
use std::fmt;

// ============= Query =============

/// The user query as submitted, plus the normalized form used as a
/// classification and cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub raw: String,
    pub normalized: String,
}

impl Query {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize_text(&raw);
        Self { raw, normalized }
    }
}

/// Lower-case and collapse all whitespace runs to a single space.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

// ============= Classification Types =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicLabel {
    Business,
    Health,
    Technology,
    Emotional,
    Social,
    Safety,
    General,
}

impl TopicLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicLabel::Business => "business",
            TopicLabel::Health => "health",
            TopicLabel::Technology => "technology",
            TopicLabel::Emotional => "emotional",
            TopicLabel::Social => "social",
            TopicLabel::Safety => "safety",
            TopicLabel::General => "general",
        }
    }
}

impl fmt::Display for TopicLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        };
        f.write_str(s)
    }
}

/// What the query asks for, independent of its topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Recommendation,
    Informational,
    Comparative,
    Analytical,
    General,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueryKind::Recommendation => "recommendation",
            QueryKind::Informational => "informational",
            QueryKind::Comparative => "comparative",
            QueryKind::Analytical => "analytical",
            QueryKind::General => "general",
        };
        f.write_str(s)
    }
}

// ============= Roles =============

/// The six fixed perspective roles.
///
/// Declaration order is the fixed role ordering used to break priority ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Facts and data
    White,
    /// Emotions and gut reactions
    Red,
    /// Benefits and opportunities
    Yellow,
    /// Risks and problems
    Black,
    /// Creative alternatives
    Green,
    /// Final synthesis
    Blue,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::White,
        Role::Red,
        Role::Yellow,
        Role::Black,
        Role::Green,
        Role::Blue,
    ];

    /// Roles fanned out concurrently in Phase 1.
    pub const PARALLEL: [Role; 4] = [Role::White, Role::Red, Role::Yellow, Role::Black];

    pub fn ordinal(&self) -> usize {
        *self as usize
    }

    pub fn is_parallel(&self) -> bool {
        Self::PARALLEL.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::White => "white",
            Role::Red => "red",
            Role::Yellow => "yellow",
            Role::Black => "black",
            Role::Green => "green",
            Role::Blue => "blue",
        }
    }

    /// What the role looks at, for prompts and display.
    pub fn focus(&self) -> &'static str {
        match self {
            Role::White => "facts",
            Role::Red => "emotion",
            Role::Yellow => "optimism",
            Role::Black => "risk",
            Role::Green => "creativity",
            Role::Blue => "synthesis",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search priority assigned to a role by the allocator.
///
/// Variants are declared highest first, so the derived `Ord` sorts
/// `Critical` before `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        f.write_str(s)
    }
}

// ============= Evidence Types =============

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub title: String,
    pub snippet: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl ResultItem {
    pub fn new(title: impl Into<String>, snippet: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
            url: url.into(),
            score: None,
        }
    }
}

/// Ordered evidence attached to one perspective invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceContext {
    items: Vec<ResultItem>,
}

impl EvidenceContext {
    pub fn new(items: Vec<ResultItem>) -> Self {
        Self { items }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ResultItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A search to issue on behalf of a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub role: Role,
    pub search_text: String,
}

// ============= Perspective Results =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerspectiveStatus {
    Ok,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveResult {
    pub role: Role,
    pub status: PerspectiveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub latency_ms: u64,
    /// Number of evidence items the role was given
    pub evidence_count: usize,
}

impl PerspectiveResult {
    pub fn ok(role: Role, payload: String, latency_ms: u64, evidence_count: usize) -> Self {
        Self {
            role,
            status: PerspectiveStatus::Ok,
            payload: Some(payload),
            failure: None,
            latency_ms,
            evidence_count,
        }
    }

    pub fn failed(role: Role, reason: impl Into<String>, latency_ms: u64, evidence_count: usize) -> Self {
        Self {
            role,
            status: PerspectiveStatus::Failed,
            payload: None,
            failure: Some(reason.into()),
            latency_ms,
            evidence_count,
        }
    }

    pub fn skipped(role: Role, reason: impl Into<String>) -> Self {
        Self {
            role,
            status: PerspectiveStatus::Skipped,
            payload: None,
            failure: Some(reason.into()),
            latency_ms: 0,
            evidence_count: 0,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == PerspectiveStatus::Ok
    }

    /// Payload text, only for successful results.
    pub fn live_payload(&self) -> Option<&str> {
        if self.is_ok() {
            self.payload.as_deref()
        } else {
            None
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Search provider error: {0}")]
    Provider(String),

    #[error("Perspective failure: {0}")]
    Perspective(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Only invariant violations move a run into the `Failed` state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::InvariantViolation(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize_text("  Should WE\tadopt\n AI? "), "should we adopt ai?");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_priority_ordering() {
        let mut priorities = vec![Priority::Low, Priority::Critical, Priority::Medium, Priority::High];
        priorities.sort();
        assert_eq!(
            priorities,
            vec![Priority::Critical, Priority::High, Priority::Medium, Priority::Low]
        );
    }

    #[test]
    fn test_role_ordering_and_membership() {
        assert_eq!(Role::White.ordinal(), 0);
        assert_eq!(Role::Blue.ordinal(), 5);
        assert!(Role::Black.is_parallel());
        assert!(!Role::Green.is_parallel());
        assert!(!Role::Blue.is_parallel());
    }

    #[test]
    fn test_live_payload_hides_failed_results() {
        let ok = PerspectiveResult::ok(Role::Red, "calm".to_string(), 3, 0);
        let failed = PerspectiveResult::failed(Role::Red, "timeout", 3, 0);
        assert_eq!(ok.live_payload(), Some("calm"));
        assert_eq!(failed.live_payload(), None);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Yellow).unwrap();
        assert_eq!(json, "\"yellow\"");
    }
}
