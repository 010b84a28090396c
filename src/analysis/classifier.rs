//! Rule-based topic and complexity classification
//!
//! Classification is lexical and deterministic: it never calls out to an
//! LLM and it is total over every input string, including the empty one.

use crate::types::{Complexity, QueryKind, TopicLabel};
use std::collections::HashSet;

/// Keyword sets per topic, in tie-break order.
const TOPIC_KEYWORDS: &[(TopicLabel, &[&str])] = &[
    (
        TopicLabel::Business,
        &[
            "business", "company", "startup", "entrepreneur", "revenue", "profit", "market",
            "competition", "strategy", "investment", "funding", "ipo", "merger", "acquisition",
            "venture", "roi", "sales", "customer",
        ],
    ),
    (
        TopicLabel::Health,
        &[
            "health", "medical", "disease", "treatment", "therapy", "doctor", "hospital",
            "medicine", "drug", "symptom", "diagnosis", "healthcare", "wellness", "nutrition",
            "exercise", "fitness", "mental health",
        ],
    ),
    (
        TopicLabel::Technology,
        &[
            "technology", "software", "programming", "ai", "machine learning", "data",
            "algorithm", "tech", "digital", "computer", "internet", "cloud", "cybersecurity",
            "blockchain", "quantum", "robotics",
        ],
    ),
    (
        TopicLabel::Emotional,
        &[
            "feel", "emotion", "feeling", "sad", "happy", "angry", "anxious", "relationship",
            "love", "family", "friendship", "personal", "mood", "psychology", "mental",
            "self-esteem", "confidence",
        ],
    ),
    (
        TopicLabel::Social,
        &[
            "society", "social", "community", "culture", "political", "government", "policy",
            "law", "ethics", "justice", "equality", "diversity", "public", "social media",
            "news", "controversy",
        ],
    ),
    (
        TopicLabel::Safety,
        &[
            "safety", "risk", "danger", "hazard", "security", "threat", "vulnerability",
            "accident", "injury", "harm", "warning", "liability", "insurance", "precaution",
        ],
    ),
];

const TECHNICAL_TERMS: &[&str] = &[
    "algorithm", "quantum", "crypto", "blockchain", "ai", "ml", "neural", "bioinformatics",
    "pharmacology",
];

const COMPARATIVE_TERMS: &[&str] = &[
    "compare", "versus", "difference", "trade-off", "pros/cons", "advantage", "disadvantage",
];

/// Query kinds in precedence order; the first kind with a cue wins.
const KIND_CUES: &[(QueryKind, &[&str])] = &[
    (QueryKind::Recommendation, &["should", "must", "recommend", "suggest"]),
    (QueryKind::Informational, &["what", "who", "where", "when", "how"]),
    (QueryKind::Comparative, &["compare", "vs", "versus", "difference"]),
    (QueryKind::Analytical, &["analyze", "evaluate", "assess"]),
];

/// Word count above which a query scores a complexity point.
const LONG_QUERY_WORDS: usize = 15;

/// Tokenised view of a normalized query, shared by every lexical rule.
#[derive(Debug, Clone)]
pub struct LexicalView<'a> {
    text: &'a str,
    tokens: HashSet<&'a str>,
    word_count: usize,
}

impl<'a> LexicalView<'a> {
    pub fn new(normalized: &'a str) -> Self {
        let words: Vec<&str> = normalized
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '/'))
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            text: normalized,
            word_count: words.len(),
            tokens: words.into_iter().collect(),
        }
    }

    /// Single words match whole tokens, phrases match as substrings.
    pub fn contains(&self, keyword: &str) -> bool {
        if keyword.contains(' ') {
            self.text.contains(keyword)
        } else {
            self.tokens.contains(keyword)
        }
    }

    pub fn count_hits(&self, keywords: &[&str]) -> usize {
        keywords.iter().filter(|k| self.contains(k)).count()
    }

    pub fn any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.contains(k))
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }
}

/// Pick the topic with the most keyword hits; ties go to the earlier topic.
pub fn classify_topic(view: &LexicalView<'_>) -> TopicLabel {
    let mut best: Option<(TopicLabel, usize)> = None;
    for (topic, keywords) in TOPIC_KEYWORDS {
        let score = view.count_hits(keywords);
        if score == 0 {
            continue;
        }
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((*topic, score)),
        }
    }
    best.map(|(topic, _)| topic).unwrap_or(TopicLabel::General)
}

pub fn classify_kind(view: &LexicalView<'_>) -> QueryKind {
    KIND_CUES
        .iter()
        .find(|(_, cues)| view.any(cues))
        .map(|(kind, _)| *kind)
        .unwrap_or(QueryKind::General)
}

pub fn classify_complexity(view: &LexicalView<'_>) -> Complexity {
    let mut score = 0;
    if view.word_count() > LONG_QUERY_WORDS {
        score += 1;
    }
    if view.any(TECHNICAL_TERMS) {
        score += 2;
    }
    let multi_part = view.text.matches('?').count() > 1
        || view.text.contains(" and ")
        || view.text.matches(',').count() > 2;
    if multi_part {
        score += 1;
    }
    if view.any(COMPARATIVE_TERMS) {
        score += 1;
    }

    match score {
        0..=1 => Complexity::Simple,
        2..=3 => Complexity::Moderate,
        _ => Complexity::Complex,
    }
}
