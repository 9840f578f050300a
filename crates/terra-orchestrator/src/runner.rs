//! Assignment orchestrator (§4.8): `generate` and `execute`. The core
//! pipeline is single-threaded cooperative (§5) — a sequence of pure
//! transformations from `terra-algo` interleaved with I/O against the
//! [`PersistenceStore`] and the solver dispatch's blocking calls.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use terra_algo::{classify_lock, classify_priority, run_waterfall, AggregatedAccount, CancellationToken, ScoringError};
use terra_core::{AccountId, AssignmentProposal, ConflictRisk, Money, Opportunity, RepId, SalesRep};

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::persistence::{AssignmentUpsert, PersistenceStore, ProposedOppOwnerUpdate, ProposedOwnerUpdate, RepFilters};
use crate::progress::{ProgressEvent, ProgressSink, Stage};
use crate::report::{ConflictEntry, ExecuteReport, GenerateReport, GenerateStatistics};

/// Relative widening applied to balance variance on an infeasible pass's
/// single retry (§7).
const INFEASIBLE_RETRY_FACTOR: f64 = 1.5;
/// A rep's projected ARR beyond this fraction over the mean halts `execute`
/// (§4.8 step 2) unless the caller bypasses the check.
const IMBALANCE_HALT_FRACTION: f64 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Customers,
    Prospects,
    All,
}

struct PassOutcome {
    proposals: Vec<AssignmentProposal>,
    rep_loads: HashMap<RepId, f64>,
    warnings: Vec<String>,
    cancelled: bool,
}

fn rep_name(reps: &[SalesRep], rep_id: &RepId) -> String {
    reps.iter()
        .find(|r| &r.rep_id == rep_id)
        .map(|r| r.name.clone())
        .unwrap_or_else(|| rep_id.to_string())
}

fn conflict_risk_for(code: &str) -> ConflictRisk {
    match code {
        "RO" => ConflictRisk::High,
        "P5" => ConflictRisk::Medium,
        _ => ConflictRisk::Low,
    }
}

/// Net-ARR view of the prospect population (§4.8 step 4): the balance
/// dimension's ARR-like coefficient is the account's summed opportunity
/// `net_arr`, floored at 0, rather than the customer-side aggregated ARR.
fn accounts_for_prospect_pass(accounts: &[AggregatedAccount], opportunities: &[Opportunity]) -> Vec<AggregatedAccount> {
    let mut net_arr_by_account: HashMap<AccountId, f64> = HashMap::new();
    for opportunity in opportunities {
        *net_arr_by_account.entry(opportunity.account_id.clone()).or_insert(0.0) += opportunity.net_arr.value();
    }
    accounts
        .iter()
        .cloned()
        .map(|mut account| {
            let pipeline = net_arr_by_account
                .get(&account.account.account_id)
                .copied()
                .unwrap_or(0.0)
                .max(0.0);
            account.aggregated_arr = Money::coerce(pipeline);
            account
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn run_pass(
    accounts_in_scope: &[AggregatedAccount],
    reps_all: &[SalesRep],
    locks: &HashMap<AccountId, terra_algo::StabilityLock>,
    config: &terra_core::Configuration,
    dispatch_config: &terra_algo::DispatchConfig,
    mut rep_loads: HashMap<RepId, f64>,
    cancel: &CancellationToken,
) -> PassOutcome {
    let mut proposals = Vec::new();
    let mut warnings = Vec::new();

    let mut locked: Vec<&AggregatedAccount> = Vec::new();
    let mut unlocked: Vec<AggregatedAccount> = Vec::new();
    for account in accounts_in_scope {
        match locks.get(&account.account.account_id) {
            Some(lock) if lock.is_locked => locked.push(account),
            _ => unlocked.push(account.clone()),
        }
    }

    let mut still_unassigned: Vec<AccountId> = Vec::new();

    for account in &locked {
        let lock = &locks[&account.account.account_id];
        match &lock.target_rep_id {
            Some(rep_id) => {
                let code = match lock.lock_type {
                    Some(terra_algo::LockType::ManualLock) => "P0",
                    _ => "P1",
                };
                *rep_loads.entry(rep_id.clone()).or_insert(0.0) += account.aggregated_arr.value();
                proposals.push(AssignmentProposal {
                    account_id: account.account.account_id.clone(),
                    current_owner_id: account.account.owner_id.clone(),
                    proposed_owner_id: rep_id.clone(),
                    rule_applied: code.to_string(),
                    rationale: terra_algo::format_rationale(
                        match code {
                            "P0" => terra_algo::PriorityCode::P0,
                            _ => terra_algo::PriorityCode::P1,
                        },
                        &account.account.name,
                        &rep_name(reps_all, rep_id),
                        &lock.reason,
                    ),
                    warnings: Vec::new(),
                    conflict_risk: ConflictRisk::Low,
                });
            }
            None => still_unassigned.push(account.account.account_id.clone()),
        }
    }

    let eligible_reps: Vec<SalesRep> = reps_all.iter().filter(|r| r.is_assignment_eligible()).cloned().collect();
    let mut cancelled = false;

    if !unlocked.is_empty() {
        if eligible_reps.is_empty() {
            warnings.push("no assignment-eligible reps; unlocked accounts routed to unassigned".to_string());
            still_unassigned.extend(unlocked.iter().map(|a| a.account.account_id.clone()));
        } else {
            let renewals_per_quarter: Vec<(terra_core::Quarter, usize)> = Vec::new();
            let mut thresholds =
                terra_algo::calculate_thresholds(accounts_in_scope, &eligible_reps, &renewals_per_quarter, config);

            let mut solved_winners: HashMap<AccountId, RepId> = HashMap::new();
            let mut residual: Vec<AggregatedAccount> = unlocked.clone();
            let mut attempts = 0;

            while attempts < 2 && !residual.is_empty() {
                if cancel.is_cancelled() {
                    cancelled = true;
                    break;
                }
                attempts += 1;
                let built = match terra_algo::build_problem_checked(&residual, &eligible_reps, &thresholds, config) {
                    Ok(built) => built,
                    Err(ScoringError::NoEligibleReps) | Err(ScoringError::AllAccountsLocked) => break,
                    Err(_) => break,
                };
                match terra_algo::solver::solve(&built, residual.len(), dispatch_config, cancel) {
                    Ok(result) if result.status.is_usable() => {
                        let winners = result.extract_winners();
                        let still = result.unassigned();
                        solved_winners.extend(winners);
                        residual.retain(|a| still.contains(&a.account.account_id));
                        break;
                    }
                    Ok(result) if result.status == terra_algo::SolveStatus::Infeasible && attempts == 1 => {
                        for dimension in terra_core::BalanceDimension::ALL {
                            if let Some(band) = thresholds.band(dimension) {
                                thresholds.set_band(dimension, band.relaxed(INFEASIBLE_RETRY_FACTOR));
                            }
                        }
                        continue;
                    }
                    _ => break,
                }
            }

            for account in &unlocked {
                if let Some(rep_id) = solved_winners.get(&account.account.account_id) {
                    let rep = eligible_reps.iter().find(|r| &r.rep_id == rep_id);
                    let code = rep.map(|r| classify_priority(account, r)).unwrap_or(terra_algo::PriorityCode::P5);
                    *rep_loads.entry(rep_id.clone()).or_insert(0.0) += account.aggregated_arr.value();
                    proposals.push(AssignmentProposal {
                        account_id: account.account.account_id.clone(),
                        current_owner_id: account.account.owner_id.clone(),
                        proposed_owner_id: rep_id.clone(),
                        rule_applied: code.code().to_string(),
                        rationale: terra_algo::format_rationale(
                            code,
                            &account.account.name,
                            &rep_name(reps_all, rep_id),
                            "MIP-optimized assignment",
                        ),
                        warnings: Vec::new(),
                        conflict_risk: conflict_risk_for(code.code()),
                    });
                }
            }

            if !residual.is_empty() && !cancelled {
                tracing::warn!(count = residual.len(), "falling back to waterfall for unsolved accounts");
                warnings.push(format!(
                    "{} accounts could not be solved by the MIP path; routed to the waterfall fallback",
                    residual.len()
                ));
                let waterfall_loads: HashMap<RepId, f64> = rep_loads.clone();
                let assignments = run_waterfall(&residual, &HashMap::new(), &eligible_reps, config, waterfall_loads);
                for assignment in assignments {
                    let account = residual
                        .iter()
                        .find(|a| a.account.account_id == assignment.account_id)
                        .expect("waterfall only returns accounts it was given");
                    *rep_loads.entry(assignment.rep_id.clone()).or_insert(0.0) += account.aggregated_arr.value();
                    proposals.push(AssignmentProposal {
                        account_id: assignment.account_id.clone(),
                        current_owner_id: account.account.owner_id.clone(),
                        proposed_owner_id: assignment.rep_id.clone(),
                        rule_applied: assignment.priority.code().to_string(),
                        rationale: terra_algo::format_rationale(
                            assignment.priority,
                            &account.account.name,
                            &rep_name(reps_all, &assignment.rep_id),
                            "waterfall fallback",
                        ),
                        warnings: vec!["assigned via waterfall fallback".to_string()],
                        conflict_risk: conflict_risk_for(assignment.priority.code()),
                    });
                }
            }
        }
    }

    for account_id in &still_unassigned {
        proposals.retain(|p| &p.account_id != account_id);
    }

    PassOutcome {
        proposals,
        rep_loads,
        warnings,
        cancelled,
    }
}

/// §4.8 `generate`. Loads inputs through `store`, auto-calibrates stale
/// thresholds, runs the customer pass then the prospect pass (when
/// `scope = all`), deduplicates by `account_id`, and classifies conflicts.
pub fn generate(
    store: &dyn PersistenceStore,
    build_id: &str,
    scope: Scope,
    dispatch_config: &terra_algo::DispatchConfig,
    now: DateTime<Utc>,
    progress: &mut dyn ProgressSink,
    cancel: &CancellationToken,
) -> OrchestratorResult<GenerateReport> {
    if cancel.is_cancelled() {
        return Err(OrchestratorError::Cancelled);
    }
    progress.emit(ProgressEvent {
        stage: Stage::LoadingInputs,
        percent: 0,
        accounts_processed: 0,
        accounts_total: 0,
    });
    let accounts = store.list_parent_accounts(build_id)?;
    let opportunities = store.list_opportunities(build_id, None)?;
    let reps_all = store.list_reps(build_id, &RepFilters::default())?;
    let mut config = store.load_config(build_id)?;

    let mut run_warnings = Vec::new();

    progress.emit(ProgressEvent {
        stage: Stage::CalibratingThresholds,
        percent: 10,
        accounts_processed: 0,
        accounts_total: accounts.len(),
    });
    if config.thresholds_stale() && cancel.is_cancelled() {
        return Err(OrchestratorError::Cancelled);
    }
    if config.thresholds_stale() {
        let eligible_reps: Vec<SalesRep> = reps_all.iter().filter(|r| r.is_assignment_eligible()).cloned().collect();
        if eligible_reps.is_empty() {
            tracing::warn!(build_id, "threshold auto-calibration skipped: no eligible reps on file");
            run_warnings.push("threshold auto-calibration skipped: no eligible reps on file".to_string());
        } else {
            let thresholds = terra_algo::calculate_thresholds(&accounts, &eligible_reps, &[], &config);
            config.thresholds = Some(thresholds);
            if store.save_config(build_id, config.clone()).is_err() {
                tracing::warn!(build_id, "threshold auto-calibration computed but could not be persisted");
                run_warnings.push("threshold auto-calibration computed but could not be persisted".to_string());
            } else {
                tracing::info!(build_id, "thresholds recalibrated");
            }
        }
    }

    progress.emit(ProgressEvent {
        stage: Stage::ClassifyingLocks,
        percent: 20,
        accounts_processed: 0,
        accounts_total: accounts.len(),
    });
    let mut locks = HashMap::new();
    let mut lock_counts = terra_algo::LockCounts::default();
    for account in &accounts {
        let lock = classify_lock(&account.account, &reps_all, &config, now);
        lock_counts.record(&lock);
        locks.insert(account.account.account_id.clone(), lock);
    }

    progress.emit(ProgressEvent {
        stage: Stage::BuildingProblem,
        percent: 30,
        accounts_processed: 0,
        accounts_total: accounts.len(),
    });

    let customer_accounts: Vec<AggregatedAccount> =
        accounts.iter().filter(|a| a.account.is_customer()).cloned().collect();
    let prospect_accounts: Vec<AggregatedAccount> = accounts_for_prospect_pass(
        &accounts.iter().filter(|a| !a.account.is_customer()).cloned().collect::<Vec<_>>(),
        &opportunities,
    );

    let mut proposals = Vec::new();
    let mut rep_loads = HashMap::new();

    if matches!(scope, Scope::Customers | Scope::All) {
        progress.emit(ProgressEvent {
            stage: Stage::Solving,
            percent: 50,
            accounts_processed: 0,
            accounts_total: customer_accounts.len(),
        });
        let outcome = run_pass(&customer_accounts, &reps_all, &locks, &config, dispatch_config, rep_loads.clone(), cancel);
        if outcome.cancelled {
            return Err(OrchestratorError::Cancelled);
        }
        proposals.extend(outcome.proposals);
        rep_loads = outcome.rep_loads;
        run_warnings.extend(outcome.warnings);
    }

    if matches!(scope, Scope::Prospects | Scope::All) {
        progress.emit(ProgressEvent {
            stage: Stage::RunningWaterfall,
            percent: 70,
            accounts_processed: 0,
            accounts_total: prospect_accounts.len(),
        });
        let outcome = run_pass(&prospect_accounts, &reps_all, &locks, &config, dispatch_config, rep_loads.clone(), cancel);
        if outcome.cancelled {
            return Err(OrchestratorError::Cancelled);
        }
        proposals.extend(outcome.proposals);
        rep_loads = outcome.rep_loads;
        run_warnings.extend(outcome.warnings);
    }
    let _ = rep_loads;

    progress.emit(ProgressEvent {
        stage: Stage::Deduplicating,
        percent: 90,
        accounts_processed: proposals.len(),
        accounts_total: accounts.len(),
    });
    // Dedup by account_id, last write wins per pass: a later push for the
    // same account replaces the earlier one.
    let mut by_account: HashMap<AccountId, AssignmentProposal> = HashMap::new();
    for proposal in proposals {
        by_account.insert(proposal.account_id.clone(), proposal);
    }
    let mut deduped: Vec<AssignmentProposal> = by_account.into_values().collect();
    deduped.sort_by(|a, b| a.account_id.cmp(&b.account_id));

    let scoped_account_ids: Vec<AccountId> = match scope {
        Scope::Customers => customer_accounts.iter().map(|a| a.account.account_id.clone()).collect(),
        Scope::Prospects => prospect_accounts.iter().map(|a| a.account.account_id.clone()).collect(),
        Scope::All => accounts.iter().map(|a| a.account.account_id.clone()).collect(),
    };
    let assigned_ids: std::collections::HashSet<&AccountId> = deduped.iter().map(|p| &p.account_id).collect();
    let unassigned_accounts: Vec<AccountId> = scoped_account_ids
        .into_iter()
        .filter(|id| !assigned_ids.contains(id))
        .collect();

    let mut by_priority_code: HashMap<String, usize> = HashMap::new();
    let mut conflicts = Vec::new();
    for proposal in &deduped {
        *by_priority_code.entry(proposal.rule_applied.clone()).or_insert(0) += 1;
        if proposal.conflict_risk != ConflictRisk::Low {
            conflicts.push(ConflictEntry {
                account_id: proposal.account_id.clone(),
                risk: proposal.conflict_risk,
                reason: proposal.rationale.clone(),
            });
        }
    }

    let total_accounts = deduped.len() + unassigned_accounts.len();
    tracing::info!(
        build_id,
        total_accounts,
        assigned = deduped.len(),
        unassigned = unassigned_accounts.len(),
        "generate finished"
    );
    Ok(GenerateReport {
        total_accounts,
        assigned_accounts: deduped.len(),
        unassigned_accounts,
        proposals: deduped,
        conflicts,
        statistics: GenerateStatistics {
            by_priority_code,
            lock_counts,
        },
    })
}

/// §4.8 `execute`. Recomputes dedup, runs the pre-flight imbalance check,
/// then writes proposed owners through the persistence interface.
pub fn execute(
    store: &dyn PersistenceStore,
    build_id: &str,
    proposals: &[AssignmentProposal],
    reps_all: &[SalesRep],
    bypass_imbalance_check: bool,
    progress: &mut dyn ProgressSink,
    cancel: &CancellationToken,
) -> OrchestratorResult<ExecuteReport> {
    if cancel.is_cancelled() {
        return Err(OrchestratorError::Cancelled);
    }
    let mut by_account: HashMap<AccountId, &AssignmentProposal> = HashMap::new();
    for proposal in proposals {
        by_account.insert(proposal.account_id.clone(), proposal);
    }
    let deduped: Vec<&AssignmentProposal> = by_account.into_values().collect();

    if !bypass_imbalance_check && !deduped.is_empty() {
        let arr_by_account: HashMap<AccountId, f64> = store
            .list_parent_accounts(build_id)?
            .into_iter()
            .map(|a| (a.account.account_id.clone(), a.aggregated_arr.value()))
            .collect();
        let mut projected: HashMap<RepId, f64> = HashMap::new();
        for proposal in &deduped {
            let arr = arr_by_account.get(&proposal.account_id).copied().unwrap_or(0.0);
            *projected.entry(proposal.proposed_owner_id.clone()).or_insert(0.0) += arr;
        }
        let mean = projected.values().sum::<f64>() / projected.len().max(1) as f64;
        if mean > 0.0 {
            if let Some((rep_id, load)) = projected
                .iter()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .filter(|(_, load)| **load > mean * (1.0 + IMBALANCE_HALT_FRACTION))
            {
                let overload_percent = ((load / mean) - 1.0) * 100.0;
                tracing::warn!(build_id, overload_percent, "execute halted on projected ARR imbalance");
                return Err(OrchestratorError::ImbalanceWarning {
                    rep_id: rep_name(reps_all, rep_id),
                    projected: *load,
                    target: mean,
                    overload_percent,
                });
            }
        }
    }

    if cancel.is_cancelled() {
        return Err(OrchestratorError::Cancelled);
    }

    progress.emit(ProgressEvent {
        stage: Stage::WritingProposals,
        percent: 50,
        accounts_processed: 0,
        accounts_total: deduped.len(),
    });

    let owner_batch: Vec<ProposedOwnerUpdate> = deduped
        .iter()
        .map(|p| ProposedOwnerUpdate {
            account_id: p.account_id.to_string(),
            new_owner_id: p.proposed_owner_id.to_string(),
            new_owner_name: rep_name(reps_all, &p.proposed_owner_id),
        })
        .collect();
    let accounts_updated = owner_batch.len();
    store.write_proposed_owners(build_id, owner_batch)?;

    let account_ids: Vec<String> = deduped.iter().map(|p| p.account_id.to_string()).collect();
    let opportunities = store.list_opportunities(build_id, Some(&account_ids))?;
    let owner_by_account: HashMap<AccountId, &AssignmentProposal> = deduped.iter().map(|p| (p.account_id.clone(), *p)).collect();
    let opp_batch: Vec<ProposedOppOwnerUpdate> = opportunities
        .iter()
        .filter_map(|opp| {
            owner_by_account.get(&opp.account_id).map(|proposal| ProposedOppOwnerUpdate {
                opportunity_id: opp.opportunity_id.to_string(),
                new_owner_id: proposal.proposed_owner_id.to_string(),
                new_owner_name: rep_name(reps_all, &proposal.proposed_owner_id),
            })
        })
        .collect();
    let opportunities_updated = opp_batch.len();
    if !opp_batch.is_empty() {
        store.write_proposed_opp_owners(build_id, opp_batch)?;
    }

    let assignment_batch: Vec<AssignmentUpsert> = deduped
        .iter()
        .map(|p| AssignmentUpsert {
            account_id: p.account_id.to_string(),
            rationale: p.rationale.clone(),
            priority_code: p.rule_applied.clone(),
        })
        .collect();
    store.upsert_assignments(build_id, assignment_batch)?;

    progress.emit(ProgressEvent {
        stage: Stage::InvalidatingCaches,
        percent: 100,
        accounts_processed: deduped.len(),
        accounts_total: deduped.len(),
    });

    tracing::info!(
        build_id,
        accounts_updated,
        opportunities_updated,
        cache_keys = ?crate::report::INVALIDATED_CACHE_KEYS,
        "execute finished; invalidating dependent caches"
    );

    Ok(ExecuteReport {
        accounts_updated,
        opportunities_updated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::JsonFixtureStore;
    use std::collections::HashSet;
    use terra_core::{Account, Configuration, Tier};
    use tempfile::NamedTempFile;

    fn account(id: &str, arr: f64, owner: Option<&str>, region: &str) -> AggregatedAccount {
        AggregatedAccount {
            account: Account {
                account_id: AccountId::from(id),
                name: id.into(),
                ultimate_parent_id: None,
                arr: Money::coerce(arr),
                atr: Money::coerce(0.0),
                pipeline_value: Money::coerce(0.0),
                hierarchy_arr: Money::coerce(arr),
                hierarchy_bookings_arr_converted: None,
                calculated_arr: None,
                tier: Tier::T2,
                geo: Some(region.into()),
                sales_territory: None,
                employee_count: None,
                enterprise_vs_commercial: None,
                industry: None,
                pe_firm: None,
                owner_id: owner.map(RepId::from),
                new_owner_id: None,
                owner_change_date: None,
                owners_lifetime: 0,
                exclude_from_reassignment: false,
                cre_count: 0,
                cre_risk: false,
                renewal_date: None,
            },
            aggregated_arr: Money::coerce(arr),
            aggregated_atr: Money::coerce(0.0),
            child_ids: HashSet::new(),
        }
    }

    fn rep(id: &str, region: &str) -> SalesRep {
        SalesRep {
            rep_id: RepId::from(id),
            name: format!("Rep {id}"),
            region: region.into(),
            team_tier: Tier::T2,
            flm: None,
            slm: None,
            pe_firms: vec![],
            is_active: true,
            include_in_assignments: true,
            is_manager: false,
            is_strategic_rep: false,
            is_backfill_source: false,
            is_backfill_target: false,
            backfill_target_rep_id: None,
        }
    }

    fn config() -> Configuration {
        Configuration {
            customer_target_arr: Money::coerce(350_000.0),
            customer_max_arr: Money::coerce(500_000.0),
            prospect_target_arr: Money::coerce(0.0),
            cre_variance: 0.1,
            atr_variance: 0.1,
            tier1_variance: 0.1,
            tier2_variance: 0.1,
            renewal_concentration_max: 0.3,
            capacity_variance_percent: 0.5,
            score_weight_continuity: 0.4,
            score_weight_geography: 0.35,
            score_weight_team_tier: 0.25,
            cre_count_threshold: 2,
            renewal_soon_window_days: 90,
            recent_change_window_days: 60,
            territory_mappings: Default::default(),
            thresholds: None,
        }
    }

    fn seeded_store(accounts: Vec<AggregatedAccount>, reps: Vec<SalesRep>) -> JsonFixtureStore {
        let tmp = NamedTempFile::new().unwrap();
        let store = JsonFixtureStore::open(tmp.path()).unwrap();
        store.seed_accounts(accounts).unwrap();
        for rep in reps {
            store.upsert_rep("b-1", rep).unwrap();
        }
        store.save_config("b-1", config()).unwrap();
        store
    }

    #[test]
    fn locked_account_is_not_silently_dropped_when_target_missing() {
        let accounts = vec![account("a-1", 100_000.0, None, "AMER")];
        let mut account_with_lock = accounts[0].clone();
        account_with_lock.account.exclude_from_reassignment = true;
        account_with_lock.account.owner_id = None;
        let store = seeded_store(vec![account_with_lock], vec![rep("r-1", "AMER")]);

        let mut sink = crate::progress::NullSink;
        let report = generate(
            &store,
            "b-1",
            Scope::All,
            &terra_algo::DispatchConfig::default(),
            Utc::now(),
            &mut sink,
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(report.unassigned_accounts, vec![AccountId::from("a-1")]);
    }

    #[test]
    fn five_customer_accounts_two_reps_partitions_within_buffer() {
        let accounts = vec![
            account("a-1", 100_000.0, None, "AMER"),
            account("a-2", 100_000.0, None, "AMER"),
            account("a-3", 150_000.0, None, "AMER"),
            account("a-4", 150_000.0, None, "AMER"),
            account("a-5", 200_000.0, None, "AMER"),
        ];
        let reps = vec![rep("r-a", "AMER"), rep("r-b", "AMER")];
        let store = seeded_store(accounts, reps);

        let mut sink = crate::progress::NullSink;
        let report = generate(
            &store,
            "b-1",
            Scope::Customers,
            &terra_algo::DispatchConfig::default(),
            Utc::now(),
            &mut sink,
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(report.assigned_accounts, 5);
        assert!(report.unassigned_accounts.is_empty());
    }

    #[test]
    fn execute_halts_on_projected_imbalance() {
        let proposals = vec![
            AssignmentProposal {
                account_id: AccountId::from("a-1"),
                current_owner_id: None,
                proposed_owner_id: RepId::from("r-a"),
                rule_applied: "P5".into(),
                rationale: "P5: a-1 -> r-a (test)".into(),
                warnings: vec![],
                conflict_risk: ConflictRisk::Medium,
            },
            AssignmentProposal {
                account_id: AccountId::from("a-2"),
                current_owner_id: None,
                proposed_owner_id: RepId::from("r-a"),
                rule_applied: "P5".into(),
                rationale: "P5: a-2 -> r-a (test)".into(),
                warnings: vec![],
                conflict_risk: ConflictRisk::Medium,
            },
            AssignmentProposal {
                account_id: AccountId::from("a-3"),
                current_owner_id: None,
                proposed_owner_id: RepId::from("r-b"),
                rule_applied: "P5".into(),
                rationale: "P5: a-3 -> r-b (test)".into(),
                warnings: vec![],
                conflict_risk: ConflictRisk::Medium,
            },
        ];
        let store = seeded_store(
            vec![
                account("a-1", 100_000.0, None, "AMER"),
                account("a-2", 100_000.0, None, "AMER"),
                account("a-3", 100_000.0, None, "AMER"),
            ],
            vec![rep("r-a", "AMER"), rep("r-b", "AMER")],
        );
        let mut sink = crate::progress::NullSink;
        let err = execute(
            &store,
            "b-1",
            &proposals,
            &[rep("r-a", "AMER"), rep("r-b", "AMER")],
            false,
            &mut sink,
            &CancellationToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, OrchestratorError::ImbalanceWarning { .. }));
    }

    #[test]
    fn execute_bypass_flag_skips_imbalance_check() {
        let proposals = vec![
            AssignmentProposal {
                account_id: AccountId::from("a-1"),
                current_owner_id: None,
                proposed_owner_id: RepId::from("r-a"),
                rule_applied: "P5".into(),
                rationale: "P5: a-1 -> r-a (test)".into(),
                warnings: vec![],
                conflict_risk: ConflictRisk::Medium,
            },
            AssignmentProposal {
                account_id: AccountId::from("a-2"),
                current_owner_id: None,
                proposed_owner_id: RepId::from("r-a"),
                rule_applied: "P5".into(),
                rationale: "P5: a-2 -> r-a (test)".into(),
                warnings: vec![],
                conflict_risk: ConflictRisk::Medium,
            },
        ];
        let store = seeded_store(vec![account("a-1", 1.0, None, "AMER"), account("a-2", 1.0, None, "AMER")], vec![rep("r-a", "AMER")]);
        let mut sink = crate::progress::NullSink;
        let report = execute(
            &store,
            "b-1",
            &proposals,
            &[rep("r-a", "AMER")],
            true,
            &mut sink,
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(report.accounts_updated, 2);
    }

    #[test]
    fn generate_rejects_an_already_cancelled_token() {
        let store = seeded_store(vec![account("a-1", 100_000.0, None, "AMER")], vec![rep("r-1", "AMER")]);
        let mut sink = crate::progress::NullSink;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = generate(
            &store,
            "b-1",
            Scope::All,
            &terra_algo::DispatchConfig::default(),
            Utc::now(),
            &mut sink,
            &cancel,
        )
        .unwrap_err();
        assert!(matches!(err, OrchestratorError::Cancelled));
    }

    #[test]
    fn execute_rejects_an_already_cancelled_token_before_any_write() {
        let proposals = vec![AssignmentProposal {
            account_id: AccountId::from("a-1"),
            current_owner_id: None,
            proposed_owner_id: RepId::from("r-a"),
            rule_applied: "P5".into(),
            rationale: "P5: a-1 -> r-a (test)".into(),
            warnings: vec![],
            conflict_risk: ConflictRisk::Medium,
        }];
        let store = seeded_store(vec![account("a-1", 100_000.0, None, "AMER")], vec![rep("r-a", "AMER")]);
        let mut sink = crate::progress::NullSink;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = execute(&store, "b-1", &proposals, &[rep("r-a", "AMER")], true, &mut sink, &cancel).unwrap_err();
        assert!(matches!(err, OrchestratorError::Cancelled));
    }
}
