use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use terra_orchestrator::{CancellationToken, JsonFixtureStore, Scope};

use crate::config;
use crate::progress::ConsoleSink;

pub fn handle(fixture: &Path, build_id: &str, scope: Scope, out: &Path) -> anyhow::Result<()> {
    let store = JsonFixtureStore::open(fixture).context("opening fixture")?;
    let dispatch_config = config::dispatch_config_from_env();
    let mut sink = ConsoleSink::new();

    // No interactive abort path exists yet in this single-shot CLI; a
    // caller embedding the orchestrator in a long-running service would
    // hold onto this token and call `.cancel()` from a signal handler.
    let cancel = CancellationToken::new();
    let report = terra_orchestrator::generate(&store, build_id, scope, &dispatch_config, Utc::now(), &mut sink, &cancel)
        .context("running generate")?;

    tracing::info!(
        total_accounts = report.total_accounts,
        assigned_accounts = report.assigned_accounts,
        unassigned = report.unassigned_accounts.len(),
        conflicts = report.conflicts.len(),
        "generate complete"
    );

    let json = serde_json::to_string_pretty(&report).context("serializing report")?;
    std::fs::write(out, json).with_context(|| format!("writing {}", out.display()))?;

    Ok(())
}
