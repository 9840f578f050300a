//! Report shapes returned by `generate`/`execute` (§4.8).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use terra_algo::LockCounts;
use terra_core::{AccountId, AssignmentProposal, ConflictRisk};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictEntry {
    pub account_id: AccountId,
    pub risk: ConflictRisk,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateStatistics {
    pub by_priority_code: HashMap<String, usize>,
    pub lock_counts: LockCounts,
}

/// `{totalAccounts, assignedAccounts, unassignedAccounts, proposals[],
/// conflicts[], statistics}` per §4.8 step 5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateReport {
    pub total_accounts: usize,
    pub assigned_accounts: usize,
    pub unassigned_accounts: Vec<AccountId>,
    pub proposals: Vec<AssignmentProposal>,
    pub conflicts: Vec<ConflictEntry>,
    pub statistics: GenerateStatistics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteReport {
    pub accounts_updated: usize,
    pub opportunities_updated: usize,
}

/// Keyed collaborator caches signalled for eviction after `execute` (§6).
/// No real cache collaborator is in scope (§1); this is the list a caller
/// wires up to whatever cache layer it fronts.
pub const INVALIDATED_CACHE_KEYS: &[&str] = &[
    "accounts",
    "opportunities",
    "assignment-rationales",
    "analytics-metrics",
    "priority-distribution",
    "last-assignment-timestamp",
    "enhanced-balancing",
    "workload-balance",
    "stability-lock-breakdown",
];
