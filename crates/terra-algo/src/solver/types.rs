//! Shared result types for the solver wrapper (§4.6).

use std::collections::HashMap;

use terra_core::{AccountId, RepId};

/// Outcome of a solve attempt, independent of which layer produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Timeout,
    Error,
}

impl SolveStatus {
    /// Whether a solution usable for extraction was returned.
    pub fn is_usable(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Which layer (§4.6) ultimately produced a [`SolveResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveLayer {
    PrimaryInProcess,
    FallbackInProcess,
    Remote,
}

/// The solver wrapper's unified return shape.
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub status: SolveStatus,
    pub layer: SolveLayer,
    pub objective: f64,
    /// `account -> rep -> value` (only the winning rep per account is kept
    /// once extracted at ≥ 0.5, but the raw per-pair values are retained
    /// here for diagnostics).
    pub assignments: HashMap<AccountId, HashMap<RepId, f64>>,
    pub slack_values: HashMap<String, f64>,
    pub solve_time_ms: f64,
    pub error: Option<String>,
}

impl SolveResult {
    /// For each account, the rep whose binary variable is ≥ 0.5.
    /// Accounts with no such rep (e.g. infeasible regions) are omitted —
    /// the orchestrator decides whether to retry with relaxed constraints.
    pub fn extract_winners(&self) -> HashMap<AccountId, RepId> {
        let mut winners = HashMap::new();
        for (account_id, by_rep) in &self.assignments {
            if let Some((rep_id, _)) = by_rep.iter().find(|(_, v)| **v >= 0.5) {
                winners.insert(account_id.clone(), rep_id.clone());
            }
        }
        winners
    }

    /// Accounts with no winning rep.
    pub fn unassigned(&self) -> Vec<AccountId> {
        self.assignments
            .keys()
            .filter(|a| !self.assignments[*a].values().any(|v| *v >= 0.5))
            .cloned()
            .collect()
    }
}
