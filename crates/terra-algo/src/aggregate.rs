//! Domain aggregator (§4.1). Pure, no I/O: materialises an
//! [`AggregatedAccount`] per parent account with ARR/ATR summed across its
//! subtree. Parent→children relations are indexed once here and never
//! recomputed downstream in scoring or the problem builder (§9).

use std::collections::{HashMap, HashSet};

use terra_core::{AccountId, Account, AggregatedAccount, Money, Opportunity};

/// Sum of `available_to_renew` over opportunities whose normalized
/// `opportunity_type` is exactly `"renewals"`, grouped by the owning
/// account id (§3 invariant — never via the raw, un-normalized string).
fn atr_by_account(opportunities: &[Opportunity]) -> HashMap<AccountId, f64> {
    let mut totals = HashMap::new();
    for opportunity in opportunities {
        if opportunity.is_renewal() {
            *totals.entry(opportunity.account_id.clone()).or_insert(0.0) +=
                opportunity.available_to_renew.value();
        }
    }
    totals
}

/// Build one [`AggregatedAccount`] per parent account in `accounts`. ARR
/// aggregation prefers `hierarchy_bookings_arr_converted`, else
/// `calculated_arr`, else `arr` (see [`AggregatedAccount::effective_arr`]);
/// non-finite inputs are already coerced to zero by `Money::coerce` at
/// construction, so no further guarding is needed here.
pub fn aggregate_accounts(accounts: &[Account], opportunities: &[Opportunity]) -> Vec<AggregatedAccount> {
    let mut children_by_parent: HashMap<AccountId, Vec<&Account>> = HashMap::new();
    for account in accounts {
        if let Some(parent_id) = &account.ultimate_parent_id {
            children_by_parent.entry(parent_id.clone()).or_default().push(account);
        }
    }
    let atr_totals = atr_by_account(opportunities);

    accounts
        .iter()
        .filter(|account| account.is_parent())
        .map(|parent| {
            let children = children_by_parent.get(&parent.account_id);
            let child_ids: HashSet<AccountId> = children
                .map(|c| c.iter().map(|child| child.account_id.clone()).collect())
                .unwrap_or_default();

            let mut arr_total = AggregatedAccount::effective_arr(parent).value();
            let mut atr_total = atr_totals.get(&parent.account_id).copied().unwrap_or(0.0);
            if let Some(children) = children {
                for child in children {
                    arr_total += AggregatedAccount::effective_arr(child).value();
                    atr_total += atr_totals.get(&child.account_id).copied().unwrap_or(0.0);
                }
            }

            AggregatedAccount {
                account: parent.clone(),
                aggregated_arr: Money::coerce(arr_total),
                aggregated_atr: Money::coerce(atr_total),
                child_ids,
            }
        })
        .collect()
}
