//! Three independent (account, rep) scorers and their weighted composite (§4.2).
//!
//! Each scorer returns a value in `[0, 1]`. The composite is a weighted sum
//! using the configuration's normalized weights — it is not itself clamped,
//! since the weights already sum to 1 and each input is in `[0, 1]`.

use terra_core::{Account, Configuration, RepId, SalesRep, Tier};

const CONTINUITY_MANAGER_CHAIN: f64 = 0.4;
const GEOGRAPHY_SIBLING_REGION: f64 = 0.65;
const GEOGRAPHY_MACRO_REGION: f64 = 0.4;
const TEAM_TIER_ADJACENT: f64 = 0.6;

/// 1.0 if `rep` is the account's current owner; ≈0.4 if `rep` is on the
/// current owner's manager chain; 0 otherwise. An account with no current
/// owner scores 0 against every rep.
pub fn continuity_score(account: &Account, rep: &SalesRep) -> f64 {
    match &account.owner_id {
        Some(owner_id) if *owner_id == rep.rep_id => 1.0,
        Some(owner_id) => {
            if rep.manager_chain().into_iter().any(|m| m == owner_id) {
                CONTINUITY_MANAGER_CHAIN
            } else {
                0.0
            }
        }
        None => 0.0,
    }
}

/// Macro-region groupings used only when no `territory_mappings` entry
/// applies. Regions not listed here never score the macro-region tier.
fn macro_region_of(region: &str) -> Option<&'static str> {
    match region.to_uppercase().as_str() {
        "AMER" | "NA" | "LATAM" => Some("AMERICAS"),
        "EMEA" | "UKI" | "DACH" => Some("EMEA"),
        "APAC" | "ANZ" | "JAPAN" => Some("APAC"),
        _ => None,
    }
}

/// 1.0 on exact region match; ≈0.65 on a sibling region from
/// `territory_mappings`; ≈0.4 on same macro-region; 0 otherwise.
///
/// The account's own region is `sales_territory` if present, else `geo`.
pub fn geography_score(account: &Account, rep: &SalesRep, config: &Configuration) -> f64 {
    let account_region = account
        .sales_territory
        .as_deref()
        .or(account.geo.as_deref());
    let Some(account_region) = account_region else {
        return 0.0;
    };

    if account_region.eq_ignore_ascii_case(&rep.region) {
        return 1.0;
    }

    if let Some(sibling) = config.territory_mappings.get(account_region) {
        if sibling.eq_ignore_ascii_case(&rep.region) {
            return GEOGRAPHY_SIBLING_REGION;
        }
    }

    match (macro_region_of(account_region), macro_region_of(&rep.region)) {
        (Some(a), Some(b)) if a == b => GEOGRAPHY_MACRO_REGION,
        _ => 0.0,
    }
}

/// 1.0 on exact tier match, ≈0.6 on adjacent tier, 0 otherwise.
pub fn team_tier_score(account: &Account, rep: &SalesRep) -> f64 {
    if account.tier == rep.team_tier {
        1.0
    } else if account.tier.is_adjacent(rep.team_tier) {
        TEAM_TIER_ADJACENT
    } else {
        0.0
    }
}

/// Weighted composite of the three scorers using the configuration's
/// normalized weights.
pub fn composite_score(account: &Account, rep: &SalesRep, config: &Configuration) -> f64 {
    let (wc, wg, wt) = config.normalized_score_weights();
    wc * continuity_score(account, rep)
        + wg * geography_score(account, rep, config)
        + wt * team_tier_score(account, rep)
}

/// Composite scores for every eligible rep against one account, as
/// `(rep_id, score)` pairs, descending by score.
pub fn rank_reps_for_account<'a>(
    account: &Account,
    reps: impl IntoIterator<Item = &'a SalesRep>,
    config: &Configuration,
) -> Vec<(RepId, f64)> {
    let mut scored: Vec<(RepId, f64)> = reps
        .into_iter()
        .filter(|rep| rep.is_assignment_eligible())
        .map(|rep| (rep.rep_id.clone(), composite_score(account, rep, config)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored
}
