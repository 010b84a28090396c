use crate::analysis::QueryAnalysis;
use crate::pipeline::aggregator::AggregatedContext;
use crate::search::budget::{BudgetSnapshot, SearchBudget};
use crate::search::cache::CacheStats;
use crate::search::wave::{self, WaveOutcome};
use crate::types::{AppError, EvidenceContext, PerspectiveResult, Query, Result, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// ============= Phases =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Init,
    Phase0,
    Phase1,
    Phase2,
    Phase3,
    Done,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }

    /// The linear chain, plus any non-terminal phase into `Failed`.
    pub fn can_transition_to(&self, next: Phase) -> bool {
        match (self, next) {
            (Phase::Init, Phase::Phase0)
            | (Phase::Phase0, Phase::Phase1)
            | (Phase::Phase1, Phase::Phase2)
            | (Phase::Phase2, Phase::Phase3)
            | (Phase::Phase3, Phase::Done) => true,
            (current, Phase::Failed) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Init => "init",
            Phase::Phase0 => "phase0",
            Phase::Phase1 => "phase1",
            Phase::Phase2 => "phase2",
            Phase::Phase3 => "phase3",
            Phase::Done => "done",
            Phase::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ============= Statistics =============

/// What one phase cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseStats {
    pub phase: Phase,
    pub duration_ms: u64,
    /// Searches that consumed a budget unit
    pub searches: usize,
    pub cache_hits: usize,
    pub failed_searches: usize,
    pub skipped_searches: usize,
}

impl PhaseStats {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            duration_ms: 0,
            searches: 0,
            cache_hits: 0,
            failed_searches: 0,
            skipped_searches: 0,
        }
    }

    pub fn record_wave(&mut self, wave: &WaveOutcome) {
        self.searches += wave.executed;
        self.cache_hits += wave.cache_hits;
        self.failed_searches += wave.failures;
        self.skipped_searches += wave.skipped.len();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub phases: Vec<PhaseStats>,
    pub total_duration_ms: u64,
    pub searches_executed: usize,
    pub successful_searches: usize,
    pub failed_searches: usize,
    pub cache_hits: usize,
    pub perspectives_ok: usize,
    pub perspectives_failed: usize,
    pub budget: BudgetSnapshot,
}

// ============= Run Report =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Done,
    Failed,
}

/// Everything a caller gets back from a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub query: String,
    pub started_at: DateTime<Utc>,
    /// Missing only if the run failed before classification
    pub analysis: Option<QueryAnalysis>,
    pub results: BTreeMap<Role, PerspectiveResult>,
    pub aggregated: Option<AggregatedContext>,
    pub status: RunStatus,
    pub failure: Option<String>,
    pub statistics: RunStatistics,
    pub cache: CacheStats,
}

impl RunReport {
    pub fn result(&self, role: Role) -> Option<&PerspectiveResult> {
        self.results.get(&role)
    }

    pub fn is_done(&self) -> bool {
        self.status == RunStatus::Done
    }
}

// ============= Run State =============

/// Mutable state of one run. Only the state machine touches it.
#[derive(Debug)]
pub struct RunState {
    pub run_id: Uuid,
    pub query: Query,
    pub started_at: DateTime<Utc>,
    pub analysis: Option<QueryAnalysis>,
    pub budget: SearchBudget,
    evidence: BTreeMap<Role, EvidenceContext>,
    results: BTreeMap<Role, PerspectiveResult>,
    pub aggregated: Option<AggregatedContext>,
    phase: Phase,
    phase_stats: Vec<PhaseStats>,
    failure: Option<String>,
}

impl RunState {
    pub fn new(run_id: Uuid, query: Query, ceiling: usize) -> Self {
        Self {
            run_id,
            query,
            started_at: Utc::now(),
            analysis: None,
            budget: SearchBudget::new(ceiling),
            evidence: BTreeMap::new(),
            results: BTreeMap::new(),
            aggregated: None,
            phase: Phase::Init,
            phase_stats: Vec::new(),
            failure: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn advance(&mut self, next: Phase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(AppError::InvariantViolation(format!(
                "illegal transition {} -> {}",
                self.phase, next
            )));
        }
        tracing::info!(from = %self.phase, to = %next, "phase transition");
        self.phase = next;
        Ok(())
    }

    /// Move to `Failed` and mark every role that never ran as skipped.
    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        if self.phase.can_transition_to(Phase::Failed) {
            self.phase = Phase::Failed;
        }
        for role in Role::ALL {
            self.results
                .entry(role)
                .or_insert_with(|| PerspectiveResult::skipped(role, "run failed before this role ran"));
        }
        self.failure = Some(reason);
    }

    pub fn evidence(&self) -> &BTreeMap<Role, EvidenceContext> {
        &self.evidence
    }

    pub fn evidence_for(&self, role: Role) -> EvidenceContext {
        self.evidence.get(&role).cloned().unwrap_or_default()
    }

    /// Add a wave's evidence for `role` after any it already has.
    pub fn supplement_evidence(&mut self, role: Role, addition: &EvidenceContext, threshold: f64) {
        let merged = match self.evidence.get(&role) {
            Some(existing) => wave::supplement(existing, addition, threshold),
            None => addition.clone(),
        };
        self.evidence.insert(role, merged);
    }

    pub fn results(&self) -> &BTreeMap<Role, PerspectiveResult> {
        &self.results
    }

    /// Store a role's result. A second result for the same role is fatal.
    pub fn record_result(&mut self, result: PerspectiveResult) -> Result<()> {
        if self.results.contains_key(&result.role) {
            return Err(AppError::InvariantViolation(format!(
                "result for {} recorded twice",
                result.role
            )));
        }
        self.results.insert(result.role, result);
        Ok(())
    }

    pub fn push_phase_stats(&mut self, stats: PhaseStats) {
        self.phase_stats.push(stats);
    }

    pub fn into_report(self, total_duration_ms: u64, cache: CacheStats) -> RunReport {
        let sum = |f: fn(&PhaseStats) -> usize| self.phase_stats.iter().map(f).sum::<usize>();
        let searches_executed = sum(|s| s.searches);
        let failed_searches = sum(|s| s.failed_searches);
        let cache_hits = sum(|s| s.cache_hits);
        let perspectives_ok = self.results.values().filter(|r| r.is_ok()).count();
        let perspectives_failed = self
            .results
            .values()
            .filter(|r| r.status == crate::types::PerspectiveStatus::Failed)
            .count();

        let statistics = RunStatistics {
            total_duration_ms,
            searches_executed,
            successful_searches: searches_executed - failed_searches,
            failed_searches,
            cache_hits,
            perspectives_ok,
            perspectives_failed,
            budget: self.budget.snapshot(),
            phases: self.phase_stats,
        };

        RunReport {
            run_id: self.run_id,
            query: self.query.raw,
            started_at: self.started_at,
            analysis: self.analysis,
            results: self.results,
            aggregated: self.aggregated,
            status: if self.phase == Phase::Done {
                RunStatus::Done
            } else {
                RunStatus::Failed
            },
            failure: self.failure,
            statistics,
            cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classify_and_allocate;
    use crate::types::{PerspectiveStatus, Priority, QueryKind, ResultItem, TopicLabel};

    fn state() -> RunState {
        RunState::new(Uuid::new_v4(), Query::new("Should we adopt AI?"), 4)
    }

    #[test]
    fn test_linear_transitions_are_legal() {
        let mut state = state();
        for next in [Phase::Phase0, Phase::Phase1, Phase::Phase2, Phase::Phase3, Phase::Done] {
            state.advance(next).unwrap();
        }
        assert_eq!(state.phase(), Phase::Done);
    }

    #[test]
    fn test_skipping_a_phase_is_an_invariant_violation() {
        let mut state = state();
        state.advance(Phase::Phase0).unwrap();
        let err = state.advance(Phase::Phase2).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(state.phase(), Phase::Phase0);
    }

    #[test]
    fn test_failed_is_absorbing() {
        assert!(Phase::Phase1.can_transition_to(Phase::Failed));
        assert!(Phase::Init.can_transition_to(Phase::Failed));
        assert!(!Phase::Failed.can_transition_to(Phase::Phase0));
        assert!(!Phase::Failed.can_transition_to(Phase::Failed));
        assert!(!Phase::Done.can_transition_to(Phase::Failed));
    }

    #[test]
    fn test_duplicate_result_is_rejected() {
        let mut state = state();
        state
            .record_result(PerspectiveResult::ok(Role::White, "a".to_string(), 1, 0))
            .unwrap();
        let err = state
            .record_result(PerspectiveResult::ok(Role::White, "b".to_string(), 1, 0))
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(state.results()[&Role::White].payload.as_deref(), Some("a"));
    }

    #[test]
    fn test_failed_run_marks_unexecuted_roles_skipped() {
        let mut state = state();
        state.advance(Phase::Phase0).unwrap();
        state
            .record_result(PerspectiveResult::ok(Role::White, "facts".to_string(), 1, 0))
            .unwrap();

        state.fail("result for red recorded twice");
        let report = state.into_report(5, CacheStats::default());

        assert_eq!(report.status, RunStatus::Failed);
        assert_eq!(report.failure.as_deref(), Some("result for red recorded twice"));
        assert_eq!(report.results.len(), 6);
        assert_eq!(report.results[&Role::White].status, PerspectiveStatus::Ok);
        for role in [Role::Red, Role::Yellow, Role::Black, Role::Green, Role::Blue] {
            assert_eq!(report.results[&role].status, PerspectiveStatus::Skipped);
        }
    }

    #[test]
    fn test_supplement_appends_to_existing_evidence() {
        let mut state = state();
        let first = EvidenceContext::new(vec![ResultItem::new("a", "first result", "u1")]);
        let second = EvidenceContext::new(vec![
            ResultItem::new("a", "first result", "u2"),
            ResultItem::new("b", "second result here", "u3"),
        ]);

        state.supplement_evidence(Role::Green, &first, 0.8);
        state.supplement_evidence(Role::Green, &second, 0.8);

        let evidence = state.evidence_for(Role::Green);
        assert_eq!(evidence.len(), 2);
        assert_eq!(evidence.items()[0].url, "u1");
    }

    #[test]
    fn test_report_totals_phase_stats() {
        let mut state = state();
        let mut p0 = PhaseStats::new(Phase::Phase0);
        p0.searches = 3;
        p0.failed_searches = 1;
        p0.cache_hits = 1;
        let mut p2 = PhaseStats::new(Phase::Phase2);
        p2.searches = 1;
        state.push_phase_stats(p0);
        state.push_phase_stats(p2);

        let report = state.into_report(10, CacheStats::default());

        assert_eq!(report.statistics.searches_executed, 4);
        assert_eq!(report.statistics.successful_searches, 3);
        assert_eq!(report.statistics.cache_hits, 1);
        assert_eq!(report.statistics.phases.len(), 2);
    }

    #[test]
    fn test_completed_report_survives_json_round_trip() {
        let mut state = RunState::new(
            Uuid::new_v4(),
            Query::new("Should we adopt AI in our company?"),
            4,
        );
        state.advance(Phase::Phase0).unwrap();
        let analysis = classify_and_allocate(&state.query, 4);
        let granted: Vec<Role> = analysis.allocation.iter().map(|r| r.role).collect();
        state.analysis = Some(analysis);
        assert!(state.budget.try_consume());
        assert!(state.budget.try_consume());

        let mut p0 = PhaseStats::new(Phase::Phase0);
        p0.duration_ms = 12;
        p0.searches = 2;
        p0.cache_hits = 1;
        p0.skipped_searches = 2;
        state.push_phase_stats(p0);

        state.advance(Phase::Phase1).unwrap();
        for role in Role::PARALLEL {
            let result = if role == Role::Black {
                PerspectiveResult::failed(role, "timed out after 60s", 60_000, 1)
            } else {
                PerspectiveResult::ok(role, format!("{} view", role), 40, 1)
            };
            state.record_result(result).unwrap();
        }
        state.push_phase_stats(PhaseStats::new(Phase::Phase1));

        state.advance(Phase::Phase2).unwrap();
        state
            .record_result(PerspectiveResult::ok(Role::Green, "green view".to_string(), 30, 0))
            .unwrap();
        let mut p2 = PhaseStats::new(Phase::Phase2);
        p2.skipped_searches = 1;
        state.push_phase_stats(p2);

        state.advance(Phase::Phase3).unwrap();
        state
            .record_result(PerspectiveResult::ok(Role::Blue, "synthesis".to_string(), 50, 0))
            .unwrap();
        state.push_phase_stats(PhaseStats::new(Phase::Phase3));
        state.advance(Phase::Done).unwrap();

        let cache = CacheStats {
            hits: 1,
            misses: 1,
            entries: 1,
            expired_entries: 0,
        };
        let report = state.into_report(250, cache.clone());

        let json = serde_json::to_string(&report).unwrap();
        let decoded: RunReport = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded.status, RunStatus::Done);
        assert!(decoded.is_done());
        assert!(decoded.failure.is_none());
        assert_eq!(decoded.run_id, report.run_id);
        assert_eq!(decoded.query, "Should we adopt AI in our company?");
        assert_eq!(decoded.started_at, report.started_at);
        assert_eq!(decoded.cache, cache);

        assert_eq!(decoded.results.len(), 6);
        assert_eq!(decoded.results, report.results);
        assert_eq!(decoded.results[&Role::Black].status, PerspectiveStatus::Failed);
        assert_eq!(
            decoded.results[&Role::Black].failure.as_deref(),
            Some("timed out after 60s")
        );
        for role in [Role::White, Role::Red, Role::Yellow, Role::Green, Role::Blue] {
            assert_eq!(decoded.results[&role].status, PerspectiveStatus::Ok, "{}", role);
        }

        let analysis = decoded.analysis.as_ref().unwrap();
        assert_eq!(analysis.topic, TopicLabel::Business);
        assert_eq!(analysis.kind, QueryKind::Recommendation);
        let decoded_order: Vec<Role> = analysis.allocation.iter().map(|r| r.role).collect();
        assert_eq!(decoded_order, granted);
        assert_eq!(decoded_order.len(), 4);
        assert_eq!(decoded_order[0], Role::White);
        assert_eq!(decoded_order[1], Role::Yellow);
        assert_eq!(analysis.priorities.get(Role::White), Priority::Critical);
        assert_eq!(analysis.priorities, report.analysis.as_ref().unwrap().priorities);
        assert_eq!(analysis.rationale, report.analysis.as_ref().unwrap().rationale);

        let stats = &decoded.statistics;
        assert_eq!(stats, &report.statistics);
        let phases: Vec<Phase> = stats.phases.iter().map(|p| p.phase).collect();
        assert_eq!(
            phases,
            vec![Phase::Phase0, Phase::Phase1, Phase::Phase2, Phase::Phase3]
        );
        assert_eq!(stats.phases[0].searches, 2);
        assert_eq!(stats.phases[0].duration_ms, 12);
        assert_eq!(stats.phases[2].skipped_searches, 1);
        assert_eq!(stats.searches_executed, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.perspectives_ok, 5);
        assert_eq!(stats.perspectives_failed, 1);
        assert_eq!(stats.total_duration_ms, 250);
        assert_eq!(stats.budget.ceiling, 4);
        assert_eq!(stats.budget.consumed, 2);
        assert_eq!(stats.budget.remaining, 2);
    }
}
