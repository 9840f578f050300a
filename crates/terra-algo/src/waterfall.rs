//! Waterfall heuristic fallback (§4.7).
//!
//! Used when every solver layer fails, or the pre-check rejects the
//! problem as too large and the remote service is unreachable.
//! Priority-ordered greedy assignment over parent accounts sorted by
//! descending ARR, tie-broken by `account_id` for determinism.

use std::collections::HashMap;

use terra_core::{AccountId, AggregatedAccount, BalanceDimension, Configuration, RepId, SalesRep};

use crate::locks::StabilityLock;
use crate::scoring::composite_score;
use crate::thresholds::dimension_value;

/// Priority code of the rule that produced an assignment, carried into the
/// rationale string so downstream reporting aggregates identically to the
/// MIP path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityCode {
    P0,
    P1,
    P2,
    P3,
    P4,
    P5,
    Ro,
}

impl PriorityCode {
    pub fn code(self) -> &'static str {
        match self {
            PriorityCode::P0 => "P0",
            PriorityCode::P1 => "P1",
            PriorityCode::P2 => "P2",
            PriorityCode::P3 => "P3",
            PriorityCode::P4 => "P4",
            PriorityCode::P5 => "P5",
            PriorityCode::Ro => "RO",
        }
    }
}

/// Label an already-decided (account, rep) pair with the priority code it
/// would have earned under the same region/owner rules the waterfall uses
/// to pick a rep in the first place (§4.8: the MIP path is declarative, so
/// the rationale generator classifies its output after the fact instead of
/// during the search).
pub fn classify_priority(account: &AggregatedAccount, rep: &SalesRep) -> PriorityCode {
    let account_region = account
        .account
        .sales_territory
        .as_deref()
        .or(account.account.geo.as_deref());
    let same_owner = account.account.owner_id.as_ref() == Some(&rep.rep_id);
    let same_region = account_region.is_some_and(|r| r.eq_ignore_ascii_case(&rep.region));

    if same_owner && same_region {
        PriorityCode::P2
    } else if same_region {
        PriorityCode::P3
    } else if same_owner {
        PriorityCode::P4
    } else {
        PriorityCode::P5
    }
}

pub struct WaterfallAssignment {
    pub account_id: AccountId,
    pub rep_id: RepId,
    pub priority: PriorityCode,
}

/// Running per-rep load across all balanced dimensions, updated after each
/// assignment so subsequent decisions see realistic capacity.
#[derive(Debug, Clone, Default)]
struct RepLoad {
    totals: HashMap<BalanceDimension, f64>,
}

impl RepLoad {
    fn add(&mut self, account: &AggregatedAccount) {
        for dimension in BalanceDimension::ALL {
            *self.totals.entry(dimension).or_insert(0.0) += dimension_value(account, dimension);
        }
    }

    fn arr(&self) -> f64 {
        *self.totals.get(&BalanceDimension::Arr).unwrap_or(&0.0)
    }
}

const SOFT_VARIANCE: f64 = 0.30;

/// Run the waterfall over accounts not already pinned by a stability lock.
/// `locks` gives each account's classification so P0/P1 can be recorded for
/// already-fixed accounts; `initial_loads` seeds rep loads from any pass
/// that already ran (e.g. the customer pass feeding the prospect pass).
pub fn run_waterfall(
    accounts: &[AggregatedAccount],
    locks: &HashMap<AccountId, StabilityLock>,
    reps: &[SalesRep],
    config: &Configuration,
    mut initial_loads: HashMap<RepId, f64>,
) -> Vec<WaterfallAssignment> {
    let eligible: Vec<&SalesRep> = reps.iter().filter(|r| r.is_assignment_eligible()).collect();
    let mut rep_loads: HashMap<RepId, RepLoad> = eligible
        .iter()
        .map(|r| {
            let mut load = RepLoad::default();
            load.totals.insert(
                BalanceDimension::Arr,
                initial_loads.remove(&r.rep_id).unwrap_or(0.0),
            );
            (r.rep_id.clone(), load)
        })
        .collect();

    let mean_target = if eligible.is_empty() {
        0.0
    } else {
        accounts
            .iter()
            .map(|a| a.aggregated_arr.value())
            .sum::<f64>()
            / eligible.len() as f64
    };

    let mut sorted: Vec<&AggregatedAccount> = accounts.iter().collect();
    sorted.sort_by(|a, b| {
        b.aggregated_arr
            .value()
            .total_cmp(&a.aggregated_arr.value())
            .then_with(|| a.account.account_id.cmp(&b.account.account_id))
    });

    let mut results = Vec::with_capacity(sorted.len());

    for account in sorted {
        let account_id = account.account.account_id.clone();

        if let Some(lock) = locks.get(&account_id) {
            if lock.is_locked {
                if let Some(target_rep) = &lock.target_rep_id {
                    let priority = match lock.lock_type {
                        Some(crate::locks::LockType::ManualLock) => PriorityCode::P0,
                        _ => PriorityCode::P1,
                    };
                    if let Some(load) = rep_loads.get_mut(target_rep) {
                        load.add(account);
                    }
                    results.push(WaterfallAssignment {
                        account_id,
                        rep_id: target_rep.clone(),
                        priority,
                    });
                    continue;
                }
            }
        }

        if eligible.is_empty() {
            continue;
        }

        let account_region = account
            .account
            .sales_territory
            .as_deref()
            .or(account.account.geo.as_deref());

        let same_region_owner = eligible.iter().find(|rep| {
            account.account.owner_id.as_ref() == Some(&rep.rep_id)
                && account_region.is_some_and(|r| r.eq_ignore_ascii_case(&rep.region))
        });
        let same_region = eligible
            .iter()
            .find(|rep| account_region.is_some_and(|r| r.eq_ignore_ascii_case(&rep.region)));
        let same_owner = eligible
            .iter()
            .find(|rep| account.account.owner_id.as_ref() == Some(&rep.rep_id));

        let (chosen, priority) = if let Some(rep) = same_region_owner {
            (*rep, PriorityCode::P2)
        } else if let Some(rep) = same_region {
            (*rep, PriorityCode::P3)
        } else if let Some(rep) = same_owner {
            (*rep, PriorityCode::P4)
        } else {
            match best_scoring_within_variance(account, &eligible, &rep_loads, mean_target, config) {
                Some(rep) => (rep, PriorityCode::P5),
                None => (least_loaded(&eligible, &rep_loads), PriorityCode::Ro),
            }
        };

        if let Some(load) = rep_loads.get_mut(&chosen.rep_id) {
            load.add(account);
        }
        results.push(WaterfallAssignment {
            account_id,
            rep_id: chosen.rep_id.clone(),
            priority,
        });
    }

    results
}

fn best_scoring_within_variance<'a>(
    account: &AggregatedAccount,
    eligible: &[&'a SalesRep],
    rep_loads: &HashMap<RepId, RepLoad>,
    mean_target: f64,
    config: &Configuration,
) -> Option<&'a SalesRep> {
    let max_load = mean_target * (1.0 + SOFT_VARIANCE);
    let mut candidates: Vec<(&&SalesRep, f64)> = eligible
        .iter()
        .filter(|rep| {
            let current = rep_loads.get(&rep.rep_id).map(|l| l.arr()).unwrap_or(0.0);
            mean_target <= 0.0 || current < max_load
        })
        .map(|rep| (rep, composite_score(&account.account, rep, config)))
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.rep_id.cmp(&b.0.rep_id)));
    candidates.first().map(|(rep, _)| **rep)
}

fn least_loaded<'a>(eligible: &[&'a SalesRep], rep_loads: &HashMap<RepId, RepLoad>) -> &'a SalesRep {
    eligible
        .iter()
        .min_by(|a, b| {
            let la = rep_loads.get(&a.rep_id).map(|l| l.arr()).unwrap_or(0.0);
            let lb = rep_loads.get(&b.rep_id).map(|l| l.arr()).unwrap_or(0.0);
            la.total_cmp(&lb).then_with(|| a.rep_id.cmp(&b.rep_id))
        })
        .copied()
        .expect("caller already checked eligible is non-empty")
}
