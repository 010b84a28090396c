//! Phased orchestration
//!
//! [`Orchestrator`] owns one run from query to [`RunReport`]. The state it
//! threads between phases lives in [`state`], the merge step between Phase 1
//! and the sequential roles in [`aggregator`], and progress notifications in
//! [`events`].

pub mod aggregator;
pub mod events;
pub mod machine;
pub mod state;

pub use aggregator::{aggregate, build_synthesis_context, AggregatedContext, SynthesisContext};
pub use events::{EventSink, PipelineEvent};
pub use machine::{Orchestrator, PipelineSettings};
pub use state::{Phase, PhaseStats, RunReport, RunState, RunStatistics, RunStatus};
