//! Phase state machine
//!
//! ```text
//! Init -> Phase0 -> Phase1 -> Phase2 -> Phase3 -> Done
//!   \________\_________\_________\_________\____-> Failed
//! ```
//!
//! - **Phase0** classifies the query and runs the first search wave for the
//!   parallel roles that were granted a slot.
//! - **Phase1** fans out the four parallel roles and waits for all of them.
//! - **Phase2** aggregates, optionally searches for the creativity role, then
//!   runs it.
//! - **Phase3** optionally searches for the synthesis role, then runs it over
//!   all five prior results.
//!
//! Search and perspective failures are data. Only an invariant violation moves
//! the run to `Failed`.

use crate::analysis::{allocator, classify_and_allocate, QueryAnalysis};
use crate::llm::Provider;
use crate::perspectives::{LlmPerspective, PerspectiveAgent, PerspectiveRequest, PerspectiveRunner};
use crate::pipeline::aggregator::{aggregate, build_synthesis_context};
use crate::pipeline::events::{EventSink, PipelineEvent};
use crate::pipeline::state::{Phase, PhaseStats, RunReport, RunState, RunStatus};
use crate::search::{
    run_wave, DuckDuckGoProvider, EvidenceCache, SearchGateway, SearchProvider, TavilyProvider,
};
use crate::types::{AppError, Priority, Query, Result, Role, SearchRequest};
use crate::utils::toml_config::{LlmProviderKind, PrismConfig, SearchProviderKind};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::Instrument;
use uuid::Uuid;

/// Tunables the state machine reads on every run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub default_ceiling: usize,
    pub duplicate_threshold: f64,
    pub perspective_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            default_ceiling: crate::search::budget::DEFAULT_CEILING,
            duplicate_threshold: crate::search::dedup::DEFAULT_DUPLICATE_THRESHOLD,
            perspective_timeout: crate::perspectives::runner::DEFAULT_TIMEOUT,
        }
    }
}

impl From<&PrismConfig> for PipelineSettings {
    fn from(config: &PrismConfig) -> Self {
        Self {
            default_ceiling: config.search.ceiling,
            duplicate_threshold: config.search.duplicate_threshold,
            perspective_timeout: config.perspectives.timeout(),
        }
    }
}

/// Drives runs through the four phases.
///
/// The evidence cache is shared by every run of one orchestrator. Each run
/// gets its own state and budget.
pub struct Orchestrator {
    gateway: SearchGateway,
    agent: Arc<dyn PerspectiveAgent>,
    runner: PerspectiveRunner,
    settings: PipelineSettings,
    events: EventSink,
}

impl Orchestrator {
    pub fn new(
        gateway: SearchGateway,
        agent: Arc<dyn PerspectiveAgent>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            gateway,
            agent,
            runner: PerspectiveRunner::new(settings.perspective_timeout),
            settings,
            events: EventSink::disabled(),
        }
    }

    /// Build the search provider, LLM client and gateway from configuration.
    pub fn from_config(config: &PrismConfig) -> Result<Self> {
        let provider: Arc<dyn SearchProvider> = match config.search.provider {
            SearchProviderKind::DuckDuckGo => Arc::new(DuckDuckGoProvider::new()),
            SearchProviderKind::Tavily => {
                let api_key = config
                    .tavily_api_key()
                    .map_err(|e| AppError::Configuration(e.to_string()))?;
                Arc::new(TavilyProvider::new(
                    api_key,
                    config.search.tavily_base_url.clone(),
                    config.search.request_timeout(),
                )?)
            }
        };

        let llm = match config.llm.provider {
            LlmProviderKind::Ollama => Provider::Ollama {
                base_url: config.llm.base_url.clone(),
                model: config.llm.model.clone(),
            },
            LlmProviderKind::OpenAI => Provider::OpenAI {
                api_key: config
                    .llm_api_key()
                    .map_err(|e| AppError::Configuration(e.to_string()))?,
                api_base: config.llm.base_url.clone(),
                model: config.llm.model.clone(),
            },
        };
        let client = llm.create_client()?;

        tracing::debug!(
            search_provider = provider.name(),
            llm_provider = llm.name(),
            model = client.model_name(),
            "orchestrator configured"
        );

        let gateway = SearchGateway::new(
            provider,
            Arc::new(EvidenceCache::new(config.search.ttl())),
            config.search.duplicate_threshold,
            config.search.max_results,
        );
        let agent = Arc::new(LlmPerspective::new(Arc::from(client)));

        Ok(Self::new(gateway, agent, PipelineSettings::from(config)))
    }

    /// Send progress events to `sender` during every run.
    pub fn with_events(mut self, sender: UnboundedSender<PipelineEvent>) -> Self {
        self.events = EventSink::new(sender);
        self
    }

    pub fn gateway(&self) -> &SearchGateway {
        &self.gateway
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run with the configured search ceiling.
    pub async fn run_default(&self, query: &str) -> RunReport {
        self.run(query, self.settings.default_ceiling).await
    }

    /// Execute one run. Always returns a report; check `status` for the outcome.
    pub async fn run(&self, query: &str, ceiling: usize) -> RunReport {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id, ceiling);
        self.execute(run_id, query, ceiling).instrument(span).await
    }

    async fn execute(&self, run_id: Uuid, query: &str, ceiling: usize) -> RunReport {
        let started = Instant::now();
        let mut state = RunState::new(run_id, Query::new(query), ceiling);

        if let Err(e) = self.drive(&mut state).await {
            tracing::error!(phase = %state.phase(), error = %e, "run failed");
            state.fail(e.to_string());
        }

        let total_duration_ms = started.elapsed().as_millis() as u64;
        let status = if state.phase() == Phase::Done {
            RunStatus::Done
        } else {
            RunStatus::Failed
        };
        tracing::info!(status = status_label(status), total_duration_ms, "run finished");
        self.events.emit(PipelineEvent::RunFinished {
            run_id,
            status,
            total_duration_ms,
        });

        state.into_report(total_duration_ms, self.gateway.cache().stats())
    }

    async fn drive(&self, state: &mut RunState) -> Result<()> {
        state.advance(Phase::Phase0)?;
        self.phase0(state).await?;

        state.advance(Phase::Phase1)?;
        self.phase1(state).await?;

        state.advance(Phase::Phase2)?;
        self.phase2(state).await?;

        state.advance(Phase::Phase3)?;
        self.phase3(state).await?;

        state.advance(Phase::Done)
    }

    /// Classify, allocate and run the first wave for the parallel roles.
    async fn phase0(&self, state: &mut RunState) -> Result<()> {
        let timer = self.begin(state, Phase::Phase0);
        let mut stats = PhaseStats::new(Phase::Phase0);

        let analysis = classify_and_allocate(&state.query, state.budget.ceiling());
        tracing::info!(rationale = %analysis.rationale, "query classified");

        let first_wave: Vec<SearchRequest> = analysis
            .allocation
            .iter()
            .filter(|request| request.role.is_parallel())
            .cloned()
            .collect();

        let wave = run_wave(&self.gateway, &first_wave, &state.budget).await;
        stats.record_wave(&wave);
        for role in Role::PARALLEL {
            state.supplement_evidence(role, &wave.context_for(role), self.settings.duplicate_threshold);
        }
        state.analysis = Some(analysis);

        self.finish(state, stats, timer);
        Ok(())
    }

    /// Fan out the four parallel roles behind a barrier.
    async fn phase1(&self, state: &mut RunState) -> Result<()> {
        let timer = self.begin(state, Phase::Phase1);

        let requests = Role::PARALLEL
            .iter()
            .map(|role| PerspectiveRequest::parallel(*role, &state.query.raw, state.evidence_for(*role)))
            .collect::<Result<Vec<_>>>()?;

        let agent = self.agent.as_ref();
        let results = join_all(requests.iter().map(|request| self.runner.run(agent, request))).await;

        if results.len() != Role::PARALLEL.len() {
            return Err(AppError::InvariantViolation(format!(
                "phase 1 produced {} results, expected {}",
                results.len(),
                Role::PARALLEL.len()
            )));
        }

        for result in results {
            self.record(state, result)?;
        }

        self.finish(state, PhaseStats::new(Phase::Phase1), timer);
        Ok(())
    }

    /// Aggregate, then run the creativity role.
    async fn phase2(&self, state: &mut RunState) -> Result<()> {
        let timer = self.begin(state, Phase::Phase2);
        let mut stats = PhaseStats::new(Phase::Phase2);

        let aggregated = aggregate(state.results(), state.evidence());
        if aggregated.degraded {
            tracing::warn!(failed = ?aggregated.failed_roles, "aggregating without every parallel role");
        }
        state.aggregated = Some(aggregated.clone());

        self.supplementary_search(state, Role::Green, &mut stats).await?;

        let request = PerspectiveRequest::creative(
            state.query.raw.clone(),
            aggregated,
            state.evidence_for(Role::Green),
        );
        let result = self.runner.run(self.agent.as_ref(), &request).await;
        self.record(state, result)?;

        self.finish(state, stats, timer);
        Ok(())
    }

    /// Run the synthesis role over everything gathered so far.
    async fn phase3(&self, state: &mut RunState) -> Result<()> {
        let timer = self.begin(state, Phase::Phase3);
        let mut stats = PhaseStats::new(Phase::Phase3);

        self.supplementary_search(state, Role::Blue, &mut stats).await?;

        let synthesis = build_synthesis_context(state.results(), state.evidence());
        let prior_results = Role::ALL
            .iter()
            .filter(|role| **role != Role::Blue)
            .map(|role| {
                state.results().get(role).cloned().ok_or_else(|| {
                    AppError::InvariantViolation(format!("no result for {} before synthesis", role))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let request = PerspectiveRequest::synthesis(
            state.query.raw.clone(),
            prior_results,
            synthesis,
            state.evidence_for(Role::Blue),
        );
        let result = self.runner.run(self.agent.as_ref(), &request).await;
        self.record(state, result)?;

        self.finish(state, stats, timer);
        Ok(())
    }

    /// One-request wave for a sequential role, appended to its evidence.
    async fn supplementary_search(
        &self,
        state: &mut RunState,
        role: Role,
        stats: &mut PhaseStats,
    ) -> Result<()> {
        let analysis = state.analysis.as_ref().ok_or_else(|| {
            AppError::InvariantViolation("query analysis missing after phase 0".to_string())
        })?;

        if state.budget.is_exhausted() || !wants_search(analysis, role) {
            return Ok(());
        }

        let request = analysis.request_for(role).cloned().unwrap_or_else(|| SearchRequest {
            role,
            search_text: allocator::search_text(&state.query.raw, role, analysis.topic),
        });

        let wave = run_wave(&self.gateway, std::slice::from_ref(&request), &state.budget).await;
        stats.record_wave(&wave);
        state.supplement_evidence(role, &wave.context_for(role), self.settings.duplicate_threshold);
        Ok(())
    }

    fn record(&self, state: &mut RunState, result: crate::types::PerspectiveResult) -> Result<()> {
        self.events.emit(PipelineEvent::PerspectiveCompleted {
            run_id: state.run_id,
            role: result.role,
            status: result.status,
            latency_ms: result.latency_ms,
        });
        state.record_result(result)
    }

    fn begin(&self, state: &RunState, phase: Phase) -> Instant {
        self.events.emit(PipelineEvent::PhaseStarted {
            run_id: state.run_id,
            phase,
        });
        Instant::now()
    }

    fn finish(&self, state: &mut RunState, mut stats: PhaseStats, timer: Instant) {
        stats.duration_ms = timer.elapsed().as_millis() as u64;
        tracing::info!(
            phase = %stats.phase,
            duration_ms = stats.duration_ms,
            searches = stats.searches,
            cache_hits = stats.cache_hits,
            remaining_budget = state.budget.remaining(),
            "phase completed"
        );
        self.events.emit(PipelineEvent::PhaseCompleted {
            run_id: state.run_id,
            stats: stats.clone(),
        });
        state.push_phase_stats(stats);
    }
}

/// Sequential roles search again when they rank at least medium or were
/// granted a slot by the allocator.
fn wants_search(analysis: &QueryAnalysis, role: Role) -> bool {
    analysis.priorities.get(role) <= Priority::Medium || analysis.is_granted(role)
}

fn status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Done => "done",
        RunStatus::Failed => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_search_follows_priority_or_grant() {
        let creative = classify_and_allocate(&Query::new("any creative alternative here?"), 0);
        assert!(wants_search(&creative, Role::Green));
        assert!(!wants_search(&creative, Role::Blue));

        let granted_all = classify_and_allocate(&Query::new("hello"), 6);
        assert!(wants_search(&granted_all, Role::Blue));
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = PrismConfig::default();
        config.search.ceiling = 2;
        config.perspectives.timeout_secs = 7;

        let settings = PipelineSettings::from(&config);
        assert_eq!(settings.default_ceiling, 2);
        assert_eq!(settings.perspective_timeout, Duration::from_secs(7));
    }
}
