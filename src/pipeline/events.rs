use crate::pipeline::state::{Phase, PhaseStats, RunStatus};
use crate::types::{PerspectiveStatus, Role};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Progress notification emitted while a run executes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    PhaseStarted {
        run_id: Uuid,
        phase: Phase,
    },
    PhaseCompleted {
        run_id: Uuid,
        stats: PhaseStats,
    },
    PerspectiveCompleted {
        run_id: Uuid,
        role: Role,
        status: PerspectiveStatus,
        latency_ms: u64,
    },
    RunFinished {
        run_id: Uuid,
        status: RunStatus,
        total_duration_ms: u64,
    },
}

/// Optional event channel. Sends after the receiver is gone are dropped.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<UnboundedSender<PipelineEvent>>,
}

impl EventSink {
    pub fn new(sender: UnboundedSender<PipelineEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: PipelineEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}
