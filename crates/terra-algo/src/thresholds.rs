//! Threshold calculator (§4.4).
//!
//! Pure function: total-for-dimension / eligible-rep-count, then the
//! dimension's variance percentage applied symmetrically. Stores nothing;
//! the caller persists the returned [`Thresholds`] along with
//! `last_calculated_at`.

use chrono::Utc;
use terra_core::{AggregatedAccount, BalanceDimension, Band, Configuration, Quarter, SalesRep, Thresholds};

/// Account-side value contributing to one balanced dimension. Also used by
/// the problem builder (§4.5) to compute constraint coefficients.
pub fn dimension_value(account: &AggregatedAccount, dimension: BalanceDimension) -> f64 {
    match dimension {
        BalanceDimension::Arr => account.aggregated_arr.value(),
        BalanceDimension::Atr => account.aggregated_atr.value(),
        BalanceDimension::Tier1 => (account.account.tier == terra_core::Tier::T1) as u8 as f64,
        BalanceDimension::Tier2 => (account.account.tier == terra_core::Tier::T2) as u8 as f64,
        BalanceDimension::Tier3 => (account.account.tier == terra_core::Tier::T3) as u8 as f64,
        BalanceDimension::Tier4 => (account.account.tier == terra_core::Tier::T4) as u8 as f64,
    }
}

fn variance_for(dimension: BalanceDimension, config: &Configuration) -> f64 {
    match dimension {
        BalanceDimension::Arr => config.capacity_variance_percent,
        BalanceDimension::Atr => config.atr_variance,
        BalanceDimension::Tier1 => config.tier1_variance,
        BalanceDimension::Tier2 => config.tier2_variance,
        BalanceDimension::Tier3 | BalanceDimension::Tier4 => config.capacity_variance_percent,
    }
}

/// Compute the `(min, target, max)` band for one dimension over the scoped
/// population. Returns `None` when there are no eligible reps (target
/// would be undefined).
pub fn compute_band(
    accounts: &[AggregatedAccount],
    eligible_rep_count: usize,
    dimension: BalanceDimension,
    config: &Configuration,
) -> Option<Band> {
    if eligible_rep_count == 0 {
        return None;
    }
    let total: f64 = accounts.iter().map(|a| dimension_value(a, dimension)).sum();
    let target = total / eligible_rep_count as f64;
    let variance = variance_for(dimension, config);
    Some(Band {
        min: target * (1.0 - variance),
        target,
        max: target * (1.0 + variance),
    })
}

/// Per-quarter renewal-count target: total renewal-window accounts in that
/// quarter divided by eligible rep count.
pub fn compute_quarterly_target(
    accounts_per_quarter: &[(Quarter, usize)],
    eligible_rep_count: usize,
) -> Vec<(Quarter, f64)> {
    if eligible_rep_count == 0 {
        return accounts_per_quarter.iter().map(|(q, _)| (*q, 0.0)).collect();
    }
    accounts_per_quarter
        .iter()
        .map(|(q, count)| (*q, *count as f64 / eligible_rep_count as f64))
        .collect()
}

/// Recompute the full set of thresholds for a scoped population.
///
/// `eligible_reps` must already be filtered to `is_active ∧
/// include_in_assignments ∧ ¬is_manager ∧ ¬is_backfill_source` (§4.4).
pub fn calculate_thresholds(
    accounts: &[AggregatedAccount],
    eligible_reps: &[SalesRep],
    renewals_per_quarter: &[(Quarter, usize)],
    config: &Configuration,
) -> Thresholds {
    let eligible_count = eligible_reps.len();
    let mut thresholds = Thresholds::default();

    for dimension in BalanceDimension::ALL {
        if let Some(band) = compute_band(accounts, eligible_count, dimension, config) {
            thresholds.set_band(dimension, band);
        }
    }

    for (quarter, target) in compute_quarterly_target(renewals_per_quarter, eligible_count) {
        thresholds
            .quarterly_renewal_targets
            .insert(quarter.to_string(), target);
    }

    thresholds.last_calculated_at = Some(Utc::now());
    thresholds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use terra_core::{AccountId, Money, RepId, Tier};

    fn aggregated(arr: f64, tier: Tier) -> AggregatedAccount {
        AggregatedAccount {
            account: terra_core::Account {
                account_id: AccountId::from("a-1"),
                name: "Acme".into(),
                ultimate_parent_id: None,
                arr: Money::coerce(arr),
                atr: Money::coerce(0.0),
                pipeline_value: Money::coerce(0.0),
                hierarchy_arr: Money::coerce(arr),
                hierarchy_bookings_arr_converted: None,
                calculated_arr: None,
                tier,
                geo: None,
                sales_territory: None,
                employee_count: None,
                enterprise_vs_commercial: None,
                industry: None,
                pe_firm: None,
                owner_id: None,
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

    fn eligible_rep(id: &str) -> SalesRep {
        SalesRep {
            rep_id: RepId::from(id),
            name: id.into(),
            region: "AMER".into(),
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
            customer_target_arr: Money::coerce(0.0),
            customer_max_arr: Money::coerce(0.0),
            prospect_target_arr: Money::coerce(0.0),
            cre_variance: 0.1,
            atr_variance: 0.1,
            tier1_variance: 0.1,
            tier2_variance: 0.2,
            renewal_concentration_max: 0.3,
            capacity_variance_percent: 0.1,
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

    #[test]
    fn arr_band_divides_total_by_rep_count() {
        let accounts = vec![aggregated(100_000.0, Tier::T2), aggregated(200_000.0, Tier::T2)];
        let band = compute_band(&accounts, 2, BalanceDimension::Arr, &config()).unwrap();
        assert_eq!(band.target, 150_000.0);
        assert!((band.min - 135_000.0).abs() < 1e-6);
        assert!((band.max - 165_000.0).abs() < 1e-6);
    }

    #[test]
    fn no_eligible_reps_yields_none() {
        let accounts = vec![aggregated(100_000.0, Tier::T2)];
        assert!(compute_band(&accounts, 0, BalanceDimension::Arr, &config()).is_none());
    }

    #[test]
    fn tier_count_dimension_counts_matching_accounts() {
        let accounts = vec![aggregated(0.0, Tier::T1), aggregated(0.0, Tier::T2), aggregated(0.0, Tier::T1)];
        let band = compute_band(&accounts, 2, BalanceDimension::Tier1, &config()).unwrap();
        assert_eq!(band.target, 1.0);
    }

    #[test]
    fn calculate_thresholds_stamps_last_calculated_at() {
        let accounts = vec![aggregated(100_000.0, Tier::T2)];
        let reps = vec![eligible_rep("r-1")];
        let thresholds = calculate_thresholds(&accounts, &reps, &[], &config());
        assert!(thresholds.last_calculated_at.is_some());
        assert!(thresholds.band(BalanceDimension::Arr).is_some());
    }

    #[test]
    fn quarterly_targets_divide_by_eligible_count() {
        let targets = compute_quarterly_target(&[(Quarter::Q1, 10)], 5);
        assert_eq!(targets, vec![(Quarter::Q1, 2.0)]);
    }
}
