use std::path::Path;

use anyhow::Context;
use terra_orchestrator::{CancellationToken, GenerateReport, JsonFixtureStore, PersistenceStore, RepFilters};

use crate::progress::ConsoleSink;

pub fn handle(fixture: &Path, build_id: &str, report: &Path, bypass_imbalance_check: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(report).with_context(|| format!("reading {}", report.display()))?;
    let report: GenerateReport = serde_json::from_str(&text).context("parsing generate report")?;

    let store = JsonFixtureStore::open(fixture).context("opening fixture")?;
    let reps_all = store
        .list_reps(build_id, &RepFilters::default())
        .context("listing reps")?;
    let mut sink = ConsoleSink::new();

    let cancel = CancellationToken::new();
    let result = terra_orchestrator::execute(
        &store,
        build_id,
        &report.proposals,
        &reps_all,
        bypass_imbalance_check,
        &mut sink,
        &cancel,
    )
    .context("running execute")?;

    tracing::info!(
        accounts_updated = result.accounts_updated,
        opportunities_updated = result.opportunities_updated,
        "execute complete"
    );

    Ok(())
}
