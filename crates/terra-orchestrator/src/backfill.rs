//! Backfill toggle (§4.8): "rep is leaving" support. Runs entirely through
//! the persistence interface; logically part of the orchestrator rather
//! than the domain model because it mutates the roster, not just proposals.

use terra_core::{AccountId, RepId, SalesRep};

use crate::error::OrchestratorResult;
use crate::persistence::{AuditRecord, PersistenceStore, ProposedOppOwnerUpdate, ProposedOwnerUpdate, RepFilters};

/// Name prefix for a synthetic backfill-target rep (§8 scenario 3).
const BACKFILL_NAME_PREFIX: &str = "BF-";

/// Enable backfill for `leaving_rep_id`: create a backfill-target rep
/// inheriting the leaving rep's region/team/tier, flip `is_backfill_source`
/// on the leaving rep, migrate every account currently owned by (or
/// proposed to move to) the leaving rep, and append an audit record.
pub fn enable_backfill(
    store: &dyn PersistenceStore,
    build_id: &str,
    leaving_rep_id: &RepId,
    actor: &str,
) -> OrchestratorResult<RepId> {
    let reps = store.list_reps(build_id, &RepFilters::default())?;
    let leaving = reps
        .iter()
        .find(|r| &r.rep_id == leaving_rep_id)
        .cloned()
        .ok_or_else(|| {
            crate::error::OrchestratorError::Persistence(format!("unknown rep '{leaving_rep_id}'"))
        })?;

    let target_id = RepId::from(format!("{BACKFILL_NAME_PREFIX}{}", leaving.rep_id));
    let target = SalesRep {
        rep_id: target_id.clone(),
        name: format!("{BACKFILL_NAME_PREFIX}{}", leaving.name),
        region: leaving.region.clone(),
        team_tier: leaving.team_tier,
        flm: leaving.flm.clone(),
        slm: leaving.slm.clone(),
        pe_firms: leaving.pe_firms.clone(),
        is_active: true,
        include_in_assignments: true,
        is_manager: false,
        is_strategic_rep: false,
        is_backfill_source: false,
        is_backfill_target: true,
        backfill_target_rep_id: None,
    };
    store.upsert_rep(build_id, target.clone())?;

    let mut updated_leaving = leaving.clone();
    updated_leaving.is_backfill_source = true;
    updated_leaving.backfill_target_rep_id = Some(target_id.clone());
    store.upsert_rep(build_id, updated_leaving)?;

    let accounts = store.list_parent_accounts(build_id)?;
    let migrated: Vec<AccountId> = accounts
        .iter()
        .filter(|a| {
            a.account.owner_id.as_ref() == Some(leaving_rep_id)
                || a.account.new_owner_id.as_ref() == Some(leaving_rep_id)
        })
        .map(|a| a.account.account_id.clone())
        .collect();

    if !migrated.is_empty() {
        let owner_batch: Vec<ProposedOwnerUpdate> = migrated
            .iter()
            .map(|account_id| ProposedOwnerUpdate {
                account_id: account_id.to_string(),
                new_owner_id: target_id.to_string(),
                new_owner_name: target.name.clone(),
            })
            .collect();
        store.write_proposed_owners(build_id, owner_batch)?;

        let opportunities = store.list_opportunities(
            build_id,
            Some(
                &migrated
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>(),
            ),
        )?;
        let opp_batch: Vec<ProposedOppOwnerUpdate> = opportunities
            .iter()
            .map(|opp| ProposedOppOwnerUpdate {
                opportunity_id: opp.opportunity_id.to_string(),
                new_owner_id: target_id.to_string(),
                new_owner_name: target.name.clone(),
            })
            .collect();
        if !opp_batch.is_empty() {
            store.write_proposed_opp_owners(build_id, opp_batch)?;
        }
    }

    store.append_audit(AuditRecord {
        action: "BACKFILL_CREATED".into(),
        table_name: "reps".into(),
        record_id: target_id.to_string(),
        build_id: build_id.to_string(),
        actor: actor.to_string(),
        old_values: serde_json::json!({ "leaving_rep_id": leaving_rep_id.to_string() }),
        new_values: serde_json::json!({
            "target_rep_id": target_id.to_string(),
            "migrated_account_count": migrated.len(),
        }),
    })?;

    Ok(target_id)
}

/// Disable backfill: revert `is_backfill_source` and `include_in_assignments`
/// on the leaving rep. Does NOT delete the created backfill-target rep or
/// revert any migration — this is a property of the system (§8), not a bug.
pub fn disable_backfill(
    store: &dyn PersistenceStore,
    build_id: &str,
    leaving_rep_id: &RepId,
    actor: &str,
) -> OrchestratorResult<()> {
    let reps = store.list_reps(build_id, &RepFilters::default())?;
    let mut leaving = reps
        .iter()
        .find(|r| &r.rep_id == leaving_rep_id)
        .cloned()
        .ok_or_else(|| {
            crate::error::OrchestratorError::Persistence(format!("unknown rep '{leaving_rep_id}'"))
        })?;

    leaving.is_backfill_source = false;
    leaving.include_in_assignments = false;
    store.upsert_rep(build_id, leaving)?;

    store.append_audit(AuditRecord {
        action: "BACKFILL_DISABLED".into(),
        table_name: "reps".into(),
        record_id: leaving_rep_id.to_string(),
        build_id: build_id.to_string(),
        actor: actor.to_string(),
        old_values: serde_json::json!({ "is_backfill_source": true }),
        new_values: serde_json::json!({ "is_backfill_source": false, "include_in_assignments": false }),
    })
}
