use std::path::Path;

use anyhow::Context;
use terra_core::RepId;
use terra_orchestrator::JsonFixtureStore;

pub fn enable(fixture: &Path, build_id: &str, rep: &str, actor: &str) -> anyhow::Result<()> {
    let store = JsonFixtureStore::open(fixture).context("opening fixture")?;
    let target = terra_orchestrator::enable_backfill(&store, build_id, &RepId::from(rep), actor)
        .context("enabling backfill")?;
    tracing::info!(leaving_rep = rep, backfill_target = %target, "backfill enabled");
    Ok(())
}

pub fn disable(fixture: &Path, build_id: &str, rep: &str, actor: &str) -> anyhow::Result<()> {
    let store = JsonFixtureStore::open(fixture).context("opening fixture")?;
    terra_orchestrator::disable_backfill(&store, build_id, &RepId::from(rep), actor)
        .context("disabling backfill")?;
    tracing::info!(leaving_rep = rep, "backfill disabled");
    Ok(())
}
