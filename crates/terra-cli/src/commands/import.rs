use std::path::Path;

use anyhow::Context;
use terra_core::{Account, Opportunity, SalesRep};
use terra_orchestrator::{JsonFixtureStore, PersistenceStore};

use crate::config;

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn handle(
    fixture: &Path,
    build_id: &str,
    accounts: &Path,
    opportunities: &Path,
    reps: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let raw_accounts: Vec<Account> = read_json(accounts)?;
    let raw_opportunities: Vec<Opportunity> = read_json(opportunities)?;
    let raw_reps: Vec<SalesRep> = read_json(reps)?;

    let aggregated = terra_algo::aggregate_accounts(&raw_accounts, &raw_opportunities);
    tracing::info!(
        accounts = raw_accounts.len(),
        parents = aggregated.len(),
        opportunities = raw_opportunities.len(),
        reps = raw_reps.len(),
        "importing into fixture {}",
        fixture.display()
    );

    let store = JsonFixtureStore::open(fixture).context("opening fixture")?;
    store.seed_accounts(aggregated).context("seeding accounts")?;
    store
        .seed_opportunities(raw_opportunities)
        .context("seeding opportunities")?;
    for rep in raw_reps {
        store.upsert_rep(build_id, rep).context("seeding rep")?;
    }

    let configuration = config::load_configuration(config_path).context("loading configuration")?;
    store.save_config(build_id, configuration).context("saving configuration")?;

    Ok(())
}
