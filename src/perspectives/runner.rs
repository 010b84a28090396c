use crate::perspectives::{PerspectiveAgent, PerspectiveRequest};
use crate::types::PerspectiveResult;
use std::time::{Duration, Instant};

/// Default per-role time limit.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs one perspective call under a time limit.
///
/// Never returns an error: a timeout, an agent error or a blank payload all
/// come back as a `Failed` result carrying the reason.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveRunner {
    timeout: Duration,
}

impl PerspectiveRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn run(
        &self,
        agent: &dyn PerspectiveAgent,
        request: &PerspectiveRequest,
    ) -> PerspectiveResult {
        let role = request.role;
        let evidence_count = request.evidence.len();
        let start = Instant::now();

        let outcome = tokio::time::timeout(self.timeout, agent.invoke(request)).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(Ok(payload)) if !payload.trim().is_empty() => {
                PerspectiveResult::ok(role, payload, latency_ms, evidence_count)
            }
            Ok(Ok(_)) => PerspectiveResult::failed(role, "empty payload", latency_ms, evidence_count),
            Ok(Err(e)) => PerspectiveResult::failed(role, e.to_string(), latency_ms, evidence_count),
            Err(_) => PerspectiveResult::failed(
                role,
                format!("timed out after {}ms", self.timeout.as_millis()),
                latency_ms,
                evidence_count,
            ),
        };

        match &result.failure {
            Some(reason) => tracing::warn!(%role, latency_ms, reason = %reason, "perspective failed"),
            None => tracing::debug!(%role, latency_ms, evidence_count, "perspective completed"),
        }

        result
    }
}

impl Default for PerspectiveRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}
