//! Aggregation of perspective results
//!
//! [`aggregate`] folds the four Phase 1 results into the context handed to
//! the creativity role. [`build_synthesis_context`] does the same for the
//! synthesis role over all five prior results. Both are pure and tolerate any
//! subset of roles having failed.

use crate::types::{EvidenceContext, PerspectiveResult, PerspectiveStatus, ResultItem, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Theme vocabulary, in reporting order.
const THEME_VOCABULARY: &[&str] = &[
    "opportunity",
    "risk",
    "benefit",
    "challenge",
    "innovation",
    "solution",
    "strategy",
    "advantage",
    "problem",
    "creative",
];

const MAX_THEMES: usize = 5;

/// Complementary Phase 1 pairs worth reconciling.
const COMPLEMENTARY_PAIRS: &[(Role, Role, &str)] = &[
    (Role::Yellow, Role::Black, "Balance benefits (yellow) with risks (black)"),
    (Role::White, Role::Red, "Ground reactions (red) in the facts (white)"),
    (Role::Red, Role::Yellow, "Combine emotions (red) with optimism (yellow)"),
];

const INSIGHTS_PER_ROLE: usize = 3;
const INSIGHT_SNIPPET_CHARS: usize = 200;
const SYNTHESIS_EVIDENCE_PER_ROLE: usize = 2;
const SYNTHESIS_SNIPPET_CHARS: usize = 150;

/// A trimmed evidence item for prompt contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceInsight {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

impl EvidenceInsight {
    fn from_item(item: &ResultItem, max_chars: usize) -> Self {
        Self {
            title: item.title.clone(),
            snippet: truncate(&item.snippet, max_chars),
            url: item.url.clone(),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

fn top_insights(
    evidence: &BTreeMap<Role, EvidenceContext>,
    roles: &[Role],
    per_role: usize,
    max_chars: usize,
) -> BTreeMap<Role, Vec<EvidenceInsight>> {
    roles
        .iter()
        .filter_map(|role| {
            let context = evidence.get(role)?;
            if context.is_empty() {
                return None;
            }
            let insights = context
                .items()
                .iter()
                .take(per_role)
                .map(|item| EvidenceInsight::from_item(item, max_chars))
                .collect();
            Some((*role, insights))
        })
        .collect()
}

// ============================================================================
// Aggregated Context
// ============================================================================

/// Read-only view over the Phase 1 results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedContext {
    /// Payloads of the parallel roles that succeeded
    pub responses: BTreeMap<Role, String>,
    /// Parallel roles that failed or never reported
    pub failed_roles: Vec<Role>,
    pub key_themes: Vec<String>,
    pub cross_references: Vec<String>,
    pub search_insights: BTreeMap<Role, Vec<EvidenceInsight>>,
    pub degraded: bool,
}

impl AggregatedContext {
    pub fn live_roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.responses.keys().copied()
    }
}

/// Fold the four parallel results into an [`AggregatedContext`].
///
/// Roles outside the parallel set are ignored. A missing or failed role is
/// listed in `failed_roles` and marks the context degraded.
pub fn aggregate(
    results: &BTreeMap<Role, PerspectiveResult>,
    evidence: &BTreeMap<Role, EvidenceContext>,
) -> AggregatedContext {
    let mut responses = BTreeMap::new();
    let mut failed_roles = Vec::new();

    for role in Role::PARALLEL {
        match results.get(&role).and_then(|r| r.live_payload()) {
            Some(payload) => {
                responses.insert(role, payload.to_string());
            }
            None => failed_roles.push(role),
        }
    }

    let key_themes = identify_themes(responses.values().map(String::as_str));
    let cross_references = COMPLEMENTARY_PAIRS
        .iter()
        .filter(|(a, b, _)| responses.contains_key(a) && responses.contains_key(b))
        .map(|(_, _, note)| note.to_string())
        .collect();

    AggregatedContext {
        degraded: !failed_roles.is_empty(),
        search_insights: top_insights(
            evidence,
            &Role::PARALLEL,
            INSIGHTS_PER_ROLE,
            INSIGHT_SNIPPET_CHARS,
        ),
        responses,
        failed_roles,
        key_themes,
        cross_references,
    }
}

fn identify_themes<'a>(payloads: impl Iterator<Item = &'a str>) -> Vec<String> {
    let text = payloads.collect::<Vec<_>>().join(" ").to_lowercase();
    THEME_VOCABULARY
        .iter()
        .filter(|theme| text.contains(*theme))
        .take(MAX_THEMES)
        .map(|theme| theme.to_string())
        .collect()
}

// ============================================================================
// Synthesis Context
// ============================================================================

/// Input assembled for the synthesis role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisContext {
    /// Live payloads of the five prior roles
    pub perspectives: BTreeMap<Role, String>,
    /// Top evidence per role across every wave
    pub evidence: BTreeMap<Role, Vec<EvidenceInsight>>,
    /// Prior roles with no usable payload
    pub degraded_roles: Vec<Role>,
    pub notes: String,
}

const PRIOR_ROLES: [Role; 5] = [Role::White, Role::Red, Role::Yellow, Role::Black, Role::Green];

pub fn build_synthesis_context(
    results: &BTreeMap<Role, PerspectiveResult>,
    evidence: &BTreeMap<Role, EvidenceContext>,
) -> SynthesisContext {
    let mut perspectives = BTreeMap::new();
    let mut degraded_roles = Vec::new();
    let mut notes = vec!["Perspective summary:".to_string()];

    for role in PRIOR_ROLES {
        let result = results.get(&role);
        match result.and_then(|r| r.live_payload()) {
            Some(payload) => {
                notes.push(format!(
                    "- {} ({}): {} characters",
                    role,
                    role.focus(),
                    payload.chars().count()
                ));
                perspectives.insert(role, payload.to_string());
            }
            None => {
                let status = match result.map(|r| r.status) {
                    Some(PerspectiveStatus::Skipped) => "skipped",
                    _ => "failed",
                };
                notes.push(format!("- {} ({}): unavailable ({})", role, role.focus(), status));
                degraded_roles.push(role);
            }
        }
    }

    SynthesisContext {
        evidence: top_insights(
            evidence,
            &PRIOR_ROLES,
            SYNTHESIS_EVIDENCE_PER_ROLE,
            SYNTHESIS_SNIPPET_CHARS,
        ),
        perspectives,
        degraded_roles,
        notes: notes.join("\n"),
    }
}
