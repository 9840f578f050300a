//! Typed progress-event stream (§9 redesign: "cascading promise chains with
//! side-effect callbacks for progress" → a step pipeline that yields typed
//! events; callers subscribe or ignore). Emission is fire-and-forget and
//! must never affect the outcome of a run (§5).

/// One stage of a `generate`/`execute` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadingInputs,
    CalibratingThresholds,
    ClassifyingLocks,
    BuildingProblem,
    Solving,
    RunningWaterfall,
    Deduplicating,
    WritingProposals,
    InvalidatingCaches,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::LoadingInputs => "loading_inputs",
            Stage::CalibratingThresholds => "calibrating_thresholds",
            Stage::ClassifyingLocks => "classifying_locks",
            Stage::BuildingProblem => "building_problem",
            Stage::Solving => "solving",
            Stage::RunningWaterfall => "running_waterfall",
            Stage::Deduplicating => "deduplicating",
            Stage::WritingProposals => "writing_proposals",
            Stage::InvalidatingCaches => "invalidating_caches",
        }
    }
}

/// A single progress tick. `percent` is a coarse 0-100 estimate over the
/// whole run, not just the current stage.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub percent: u8,
    pub accounts_processed: usize,
    pub accounts_total: usize,
}

/// Callers subscribe by passing a closure; ignoring progress is as cheap as
/// passing [`NullSink::emit`]. Never affects run outcome — see §5.
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);
}

impl<F: FnMut(ProgressEvent)> ProgressSink for F {
    fn emit(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// A sink that drops every event; the default for callers that don't care.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&mut self, _event: ProgressEvent) {}
}
