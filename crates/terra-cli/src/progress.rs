//! Console progress rendering. The orchestrator's [`ProgressSink`] trait
//! accepts any closure (§9), so this is the CLI's own thin subscriber rather
//! than anything the orchestrator needs to know about.

use terra_orchestrator::{ProgressEvent, ProgressSink};

pub struct ConsoleSink {
    last_stage_label: Option<&'static str>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self { last_stage_label: None }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleSink {
    fn emit(&mut self, event: ProgressEvent) {
        let label = event.stage.label();
        if self.last_stage_label != Some(label) {
            self.last_stage_label = Some(label);
            tracing::info!(
                stage = label,
                percent = event.percent,
                accounts_processed = event.accounts_processed,
                accounts_total = event.accounts_total,
                "{label} ({}%)",
                event.percent
            );
        }
    }
}
