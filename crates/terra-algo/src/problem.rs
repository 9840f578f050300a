//! LP/MIP problem builder (§4.5) — the hardest component.
//!
//! Builds a backend-agnostic [`LpModel`] (see [`crate::lp_format`]) from the
//! scored (account, rep) pairs and per-rep, per-dimension capacity targets.
//! Every monetary constraint coefficient is normalised by its dimension's
//! target so the matrix stays within the numerical-stability discipline
//! described in §4.5 — no raw ARR values, no `1eN / target` penalty terms.

use std::collections::HashMap;

use terra_core::{AccountId, AggregatedAccount, BalanceDimension, Configuration, RepId, SalesRep, Thresholds};

use crate::lp_format::{Bound, Constraint, LpModel, Relation};
use crate::scoring::composite_score;
use crate::thresholds::dimension_value;

/// Safe ceiling on assignment variables for the in-process solver (§4.5 pre-check).
pub const MAX_IN_PROCESS_VARIABLES: usize = 30_000;
/// Safe ceiling on serialised problem size in bytes (§4.5 pre-check).
pub const MAX_IN_PROCESS_BYTES: usize = 5 * 1024 * 1024;

const ALPHA_WEIGHT: f64 = 0.001;
const BETA_WEIGHT: f64 = 0.01;
const BIG_M_WEIGHT: f64 = 0.1;
const BUFFER_FACTOR: f64 = 5.0;

/// Resolves a solved variable name back to the (account, rep) pair it
/// represents, so the solver wrapper's extraction step (§4.6) doesn't need
/// to re-derive indices.
#[derive(Debug, Clone, Default)]
pub struct VariableIndex {
    pub accounts: Vec<AccountId>,
    pub reps: Vec<RepId>,
    account_lookup: HashMap<AccountId, usize>,
    rep_lookup: HashMap<RepId, usize>,
}

impl VariableIndex {
    fn new(accounts: Vec<AccountId>, reps: Vec<RepId>) -> Self {
        let account_lookup = accounts.iter().cloned().enumerate().map(|(i, a)| (a, i)).collect();
        let rep_lookup = reps.iter().cloned().enumerate().map(|(i, r)| (r, i)).collect();
        Self {
            accounts,
            reps,
            account_lookup,
            rep_lookup,
        }
    }

    pub fn assignment_var(&self, account_id: &AccountId, rep_id: &RepId) -> Option<String> {
        let a = self.account_lookup.get(account_id)?;
        let r = self.rep_lookup.get(rep_id)?;
        Some(format!("x{a}_{r}"))
    }

    /// Reverse lookup used by the solver wrapper's extraction step: given a
    /// solved variable name of the form `x{a}_{r}`, recover the pair.
    pub fn resolve_assignment_var(&self, var_name: &str) -> Option<(AccountId, RepId)> {
        let rest = var_name.strip_prefix('x')?;
        let (a_idx, r_idx) = rest.split_once('_')?;
        let a_idx: usize = a_idx.parse().ok()?;
        let r_idx: usize = r_idx.parse().ok()?;
        Some((self.accounts.get(a_idx)?.clone(), self.reps.get(r_idx)?.clone()))
    }
}

/// The six slack variable names for one (dimension, rep) pair.
struct SlackNames {
    alpha_over: String,
    alpha_under: String,
    beta_over: String,
    beta_under: String,
    m_over: String,
    m_under: String,
}

fn slack_names(dimension_index: usize, rep_index: usize) -> SlackNames {
    SlackNames {
        alpha_over: format!("so{dimension_index}_{rep_index}"),
        alpha_under: format!("su{dimension_index}_{rep_index}"),
        beta_over: format!("bo{dimension_index}_{rep_index}"),
        beta_under: format!("bu{dimension_index}_{rep_index}"),
        m_over: format!("mo{dimension_index}_{rep_index}"),
        m_under: format!("mu{dimension_index}_{rep_index}"),
    }
}

/// A fully built problem, ready for [`crate::lp_format::emit`] or direct
/// in-process solving (§4.6).
pub struct BuiltProblem {
    pub model: LpModel,
    pub index: VariableIndex,
}

impl BuiltProblem {
    /// Number of assignment-variable count for the §4.5 pre-check.
    pub fn variable_count(&self) -> usize {
        self.index.accounts.len() * self.index.reps.len()
    }

    /// Whether this problem exceeds the in-process solver's safe ceilings.
    pub fn is_too_large_for_in_process(&self) -> bool {
        if self.variable_count() > MAX_IN_PROCESS_VARIABLES {
            return true;
        }
        let (text, _) = crate::lp_format::emit(&self.model);
        text.len() > MAX_IN_PROCESS_BYTES
    }
}

/// Fail-fast entry point (§7 "invalid input"): rejects empty reps/accounts
/// before any LP construction work happens.
pub fn build_problem_checked(
    accounts: &[AggregatedAccount],
    reps: &[SalesRep],
    thresholds: &Thresholds,
    config: &Configuration,
) -> crate::error::ScoringResult<BuiltProblem> {
    if reps.is_empty() {
        return Err(crate::error::ScoringError::NoEligibleReps);
    }
    if accounts.is_empty() {
        return Err(crate::error::ScoringError::AllAccountsLocked);
    }
    Ok(build_problem(accounts, reps, thresholds, config))
}

/// Build the assignment MIP for one pass over unlocked, eligible accounts
/// and eligible reps.
///
/// `accounts` and `reps` must already exclude locked accounts (§4.3 pins
/// those outside the problem) and ineligible reps (§4.4's eligibility
/// filter).
pub fn build_problem(
    accounts: &[AggregatedAccount],
    reps: &[SalesRep],
    thresholds: &Thresholds,
    config: &Configuration,
) -> BuiltProblem {
    let account_ids: Vec<AccountId> = accounts.iter().map(|a| a.account.account_id.clone()).collect();
    let rep_ids: Vec<RepId> = reps.iter().map(|r| r.rep_id.clone()).collect();
    let index = VariableIndex::new(account_ids, rep_ids);

    let mut model = LpModel::default();

    // Binary assignment variables + objective score terms.
    for (a_idx, account) in accounts.iter().enumerate() {
        for (r_idx, rep) in reps.iter().enumerate() {
            let var = format!("x{a_idx}_{r_idx}");
            model.binaries.push(var.clone());
            let score = composite_score(&account.account, rep, config);
            if score.abs() >= 1e-10 {
                model.objective.push((score, var));
            }
        }
    }

    // Assignment constraints: for each account, sum over reps = 1.
    for (a_idx, _) in accounts.iter().enumerate() {
        let terms = (0..reps.len())
            .map(|r_idx| (1.0, format!("x{a_idx}_{r_idx}")))
            .collect();
        model.constraints.push(Constraint {
            name: format!("assign_{a_idx}"),
            terms,
            relation: Relation::Eq,
            rhs: 1.0,
        });
    }

    // Balance decomposition + slack bounds + penalty objective terms.
    for (d_idx, dimension) in BalanceDimension::ALL.into_iter().enumerate() {
        let Some(band) = thresholds.band(dimension) else {
            continue;
        };
        if band.target.abs() < 1e-10 {
            continue;
        }
        let variance = ((band.max - band.target) / band.target).abs();
        let buffer = variance * BUFFER_FACTOR;

        for (r_idx, _rep) in reps.iter().enumerate() {
            let slacks = slack_names(d_idx, r_idx);

            let mut terms: Vec<(f64, String)> = accounts
                .iter()
                .enumerate()
                .map(|(a_idx, account)| {
                    let raw = dimension_value(account, dimension);
                    let coefficient = if dimension.is_count_dimension() {
                        raw
                    } else {
                        raw / band.target
                    };
                    (coefficient, format!("x{a_idx}_{r_idx}"))
                })
                .collect();

            terms.push((-1.0, slacks.alpha_over.clone()));
            terms.push((1.0, slacks.alpha_under.clone()));
            terms.push((-1.0, slacks.beta_over.clone()));
            terms.push((1.0, slacks.beta_under.clone()));
            terms.push((-1.0, slacks.m_over.clone()));
            terms.push((1.0, slacks.m_under.clone()));

            model.constraints.push(Constraint {
                name: format!("bal_{d_idx}_{r_idx}"),
                terms,
                relation: Relation::Eq,
                rhs: 1.0,
            });

            model.bounds.push(Bound {
                var: slacks.alpha_over.clone(),
                lower: 0.0,
                upper: variance,
            });
            model.bounds.push(Bound {
                var: slacks.alpha_under.clone(),
                lower: 0.0,
                upper: variance,
            });
            model.bounds.push(Bound {
                var: slacks.beta_over.clone(),
                lower: 0.0,
                upper: buffer,
            });
            model.bounds.push(Bound {
                var: slacks.beta_under.clone(),
                lower: 0.0,
                upper: buffer,
            });
            // M slacks are unbounded above; a large-but-finite upper bound keeps
            // the LP text's Bounds section well-formed without constraining the
            // solver in practice.
            model.bounds.push(Bound {
                var: slacks.m_over.clone(),
                lower: 0.0,
                upper: 1e12,
            });
            model.bounds.push(Bound {
                var: slacks.m_under.clone(),
                lower: 0.0,
                upper: 1e12,
            });

            for (var, weight) in [
                (&slacks.alpha_over, ALPHA_WEIGHT),
                (&slacks.alpha_under, ALPHA_WEIGHT),
                (&slacks.beta_over, BETA_WEIGHT),
                (&slacks.beta_under, BETA_WEIGHT),
                (&slacks.m_over, BIG_M_WEIGHT),
                (&slacks.m_under, BIG_M_WEIGHT),
            ] {
                model.objective.push((-weight, var.clone()));
            }
        }
    }

    BuiltProblem { model, index }
}
