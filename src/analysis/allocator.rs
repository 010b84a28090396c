//! Priority assignment and greedy search-slot allocation

use crate::analysis::classifier::LexicalView;
use crate::types::{Complexity, Priority, Role, SearchRequest, TopicLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What makes a non-facts role want evidence.
struct RoleTriggers {
    role: Role,
    topics: &'static [TopicLabel],
    cues: &'static [&'static str],
    complex_eligible: bool,
}

const TRIGGERS: &[RoleTriggers] = &[
    RoleTriggers {
        role: Role::Red,
        topics: &[TopicLabel::Emotional, TopicLabel::Social],
        cues: &["feel", "emotion", "reaction", "response", "sentiment"],
        complex_eligible: false,
    },
    RoleTriggers {
        role: Role::Yellow,
        topics: &[TopicLabel::Business],
        cues: &["benefit", "advantage", "opportunity", "success", "positive"],
        complex_eligible: true,
    },
    RoleTriggers {
        role: Role::Black,
        topics: &[TopicLabel::Health, TopicLabel::Safety],
        cues: &["risk", "problem", "failure", "danger", "criticism"],
        complex_eligible: false,
    },
    RoleTriggers {
        role: Role::Green,
        topics: &[],
        cues: &["creative", "innovation", "alternative", "solution", "breakthrough"],
        complex_eligible: true,
    },
];

/// Priority of every role for one query.
///
/// The facts role is always `Critical` and is the only `Critical` role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePriorities(BTreeMap<Role, Priority>);

impl RolePriorities {
    pub fn get(&self, role: Role) -> Priority {
        self.0.get(&role).copied().unwrap_or(Priority::Low)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, Priority)> + '_ {
        self.0.iter().map(|(r, p)| (*r, *p))
    }
}

pub fn assign_priorities(
    view: &LexicalView<'_>,
    topic: TopicLabel,
    complexity: Complexity,
) -> RolePriorities {
    let mut map = BTreeMap::new();
    map.insert(Role::White, Priority::Critical);

    for trigger in TRIGGERS {
        let priority = if trigger.topics.contains(&topic) {
            Priority::High
        } else if view.any(trigger.cues)
            || (trigger.complex_eligible && complexity == Complexity::Complex)
        {
            Priority::Medium
        } else {
            Priority::Low
        };
        map.insert(trigger.role, priority);
    }

    // Synthesis has no triggers of its own
    map.insert(Role::Blue, Priority::Low);

    RolePriorities(map)
}

/// Grant one slot per role, highest priority first, until the ceiling is hit.
///
/// Ties fall back to the fixed role ordering. No partial slots, no backtracking.
pub fn allocate(priorities: &RolePriorities, ceiling: usize) -> Vec<Role> {
    let mut ranked: Vec<Role> = Role::ALL.to_vec();
    ranked.sort_by_key(|role| (priorities.get(*role), role.ordinal()));
    ranked.truncate(ceiling);
    ranked
}

/// Role- and topic-specific search text for a granted slot.
pub fn search_text(query: &str, role: Role, topic: TopicLabel) -> String {
    use TopicLabel::*;

    let suffix = match role {
        Role::White => "facts statistics data research",
        Role::Red => match topic {
            Emotional => "reactions opinions feelings response",
            Social => "public opinion social response reactions",
            Health => "patient experiences emotional impact",
            Business => "customer reviews business sentiment",
            Technology => "user experience community feedback",
            _ => "opinion reaction sentiment response",
        },
        Role::Yellow => match topic {
            Business => "business benefits advantages opportunities success case studies",
            Health => "health benefits positive outcomes improvements",
            Technology => "innovation benefits technological advantages improvements",
            General => "benefits advantages opportunities positive aspects",
            _ => "benefits advantages opportunities",
        },
        Role::Black => match topic {
            Health => "health risks side effects dangers problems",
            Safety => "safety risks hazards dangers warnings",
            Business => "business risks challenges problems failures",
            Technology => "technology risks cybersecurity threats problems",
            General => "risks problems challenges limitations",
            _ => "risks problems challenges",
        },
        Role::Green => "creative solutions alternatives innovation new approaches",
        Role::Blue => "best practices framework methodology",
    };

    let query = query.trim();
    if query.is_empty() {
        suffix.to_string()
    } else {
        format!("{} {}", query, suffix)
    }
}

pub fn build_requests(query: &str, topic: TopicLabel, granted: &[Role]) -> Vec<SearchRequest> {
    granted
        .iter()
        .map(|role| SearchRequest {
            role: *role,
            search_text: search_text(query, *role, topic),
        })
        .collect()
}
