//! Domain aggregates: accounts, reps, opportunities, configuration.
//!
//! These are closed product types with explicit field presence — optional
//! numeric fields are `Money`/`Option<T>`, never a string that happens to
//! parse as a number. Coercion from raw input happens once, at construction,
//! never again downstream.

use crate::fiscal::Quarter;
use crate::ids::{AccountId, OpportunityId, RepId};
use crate::money::Money;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Segmentation tier. `None` is a real, present value, distinct from "not
/// yet classified" (which callers should never construct).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    T1,
    T2,
    T3,
    T4,
    None,
}

impl Tier {
    /// Derives a tier from the expansion/initial-sale pair: `expansion_tier`
    /// wins when present, else `initial_sale_tier`, else `Tier::None`.
    pub fn derive(expansion_tier: Option<Tier>, initial_sale_tier: Option<Tier>) -> Tier {
        expansion_tier.or(initial_sale_tier).unwrap_or(Tier::None)
    }

    /// Adjacent-tier relation used by scoring (§4.2 team-tier score).
    pub fn is_adjacent(self, other: Tier) -> bool {
        let rank = |t: Tier| -> Option<i32> {
            match t {
                Tier::T1 => Some(1),
                Tier::T2 => Some(2),
                Tier::T3 => Some(3),
                Tier::T4 => Some(4),
                Tier::None => None,
            }
        };
        match (rank(self), rank(other)) {
            (Some(a), Some(b)) => (a - b).abs() == 1,
            _ => false,
        }
    }
}

/// An account (customer or prospect). Child accounts roll up into a parent's
/// [`crate::domain::AggregatedAccount`]; see [`Account::is_parent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub name: String,
    pub ultimate_parent_id: Option<AccountId>,

    pub arr: Money,
    pub atr: Money,
    pub pipeline_value: Money,
    pub hierarchy_arr: Money,
    pub hierarchy_bookings_arr_converted: Option<Money>,
    pub calculated_arr: Option<Money>,

    pub tier: Tier,
    pub geo: Option<String>,
    pub sales_territory: Option<String>,
    pub employee_count: Option<u64>,
    pub enterprise_vs_commercial: Option<String>,
    pub industry: Option<String>,
    pub pe_firm: Option<String>,

    pub owner_id: Option<RepId>,
    pub new_owner_id: Option<RepId>,
    pub owner_change_date: Option<DateTime<Utc>>,
    pub owners_lifetime: u32,
    pub exclude_from_reassignment: bool,

    pub cre_count: u32,
    pub cre_risk: bool,
    pub renewal_date: Option<NaiveDate>,
}

impl Account {
    /// A parent account is one with no `ultimate_parent_id`.
    pub fn is_parent(&self) -> bool {
        self.ultimate_parent_id.is_none()
    }

    /// `is_customer = (hierarchy_arr > 0)` — never consult free-text type columns.
    pub fn is_customer(&self) -> bool {
        self.hierarchy_arr.value() > 0.0
    }
}

/// A sales representative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesRep {
    pub rep_id: RepId,
    pub name: String,
    pub region: String,
    pub team_tier: Tier,
    pub flm: Option<RepId>,
    pub slm: Option<RepId>,
    pub pe_firms: Vec<String>,

    pub is_active: bool,
    pub include_in_assignments: bool,
    pub is_manager: bool,
    pub is_strategic_rep: bool,
    pub is_backfill_source: bool,
    pub is_backfill_target: bool,
    pub backfill_target_rep_id: Option<RepId>,
}

impl SalesRep {
    /// Eligible reps per §4.4: active, opted in, not a manager, not a backfill source.
    pub fn is_assignment_eligible(&self) -> bool {
        self.is_active
            && self.include_in_assignments
            && !self.is_manager
            && !self.is_backfill_source
    }

    /// Manager chain used by the continuity scorer (§4.2): direct + second-line manager.
    pub fn manager_chain(&self) -> Vec<&RepId> {
        [self.flm.as_ref(), self.slm.as_ref()]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Normalizes a raw opportunity-type string for comparison: trims whitespace
/// and lowercases. Only the literal normalized value `"renewals"` counts
/// toward ATR — `"renewal"` (singular) does not.
pub fn normalize_opportunity_type(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether a normalized opportunity type counts toward ATR.
pub fn counts_as_renewal(normalized_opportunity_type: &str) -> bool {
    normalized_opportunity_type == "renewals"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub opportunity_id: OpportunityId,
    pub account_id: AccountId,
    pub owner_id: Option<RepId>,
    pub new_owner_id: Option<RepId>,
    pub opportunity_type: String,
    pub available_to_renew: Money,
    pub net_arr: Money,
    pub amount: Money,
    pub renewal_event_date: Option<NaiveDate>,
    pub close_date: Option<NaiveDate>,
    pub cre_status: Option<String>,
}

impl Opportunity {
    /// True iff this opportunity's normalized type is the literal "renewals".
    pub fn is_renewal(&self) -> bool {
        counts_as_renewal(&normalize_opportunity_type(&self.opportunity_type))
    }

    pub fn fiscal_quarter(&self) -> Option<Quarter> {
        self.renewal_event_date.map(crate::fiscal::quarter_of_date)
    }
}

/// Min/target/max band for one balanced dimension, already variance-applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub target: f64,
    pub max: f64,
}

impl Band {
    pub fn trivial_at(target: f64) -> Self {
        Self {
            min: target,
            target,
            max: target,
        }
    }

    /// Widen the band by multiplying its half-width by `factor` (used when
    /// the solver retries an infeasible pass with relaxed variance, §7).
    pub fn relaxed(self, factor: f64) -> Self {
        let half_width_min = self.target - self.min;
        let half_width_max = self.max - self.target;
        Self {
            min: self.target - half_width_min * factor,
            target: self.target,
            max: self.max + half_width_max * factor,
        }
    }
}

/// The balanced dimensions the LP/MIP problem builder decomposes per rep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceDimension {
    Arr,
    Atr,
    Tier1,
    Tier2,
    Tier3,
    Tier4,
}

impl BalanceDimension {
    pub const ALL: [BalanceDimension; 6] = [
        BalanceDimension::Arr,
        BalanceDimension::Atr,
        BalanceDimension::Tier1,
        BalanceDimension::Tier2,
        BalanceDimension::Tier3,
        BalanceDimension::Tier4,
    ];

    /// Count dimensions contribute 1 per matching account; monetary
    /// dimensions contribute the account's raw value (to be normalised by
    /// target in the problem builder).
    pub fn is_count_dimension(self) -> bool {
        !matches!(self, BalanceDimension::Arr | BalanceDimension::Atr)
    }
}

/// Cached, derived per-rep thresholds plus quarterly renewal targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thresholds {
    pub bands: HashMap<String, Band>,
    pub quarterly_renewal_targets: HashMap<String, f64>,
    pub last_calculated_at: Option<DateTime<Utc>>,
}

impl Thresholds {
    pub fn band(&self, dimension: BalanceDimension) -> Option<Band> {
        self.bands.get(dimension_key(dimension)).copied()
    }

    pub fn set_band(&mut self, dimension: BalanceDimension, band: Band) {
        self.bands.insert(dimension_key(dimension).to_string(), band);
    }

    pub fn quarterly_target(&self, quarter: Quarter) -> Option<f64> {
        self.quarterly_renewal_targets.get(&quarter.to_string()).copied()
    }
}

fn dimension_key(dimension: BalanceDimension) -> &'static str {
    match dimension {
        BalanceDimension::Arr => "arr",
        BalanceDimension::Atr => "atr",
        BalanceDimension::Tier1 => "tier1",
        BalanceDimension::Tier2 => "tier2",
        BalanceDimension::Tier3 => "tier3",
        BalanceDimension::Tier4 => "tier4",
    }
}

/// Variance percentages and monetary targets for one build (scope = "all").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub customer_target_arr: Money,
    pub customer_max_arr: Money,
    pub prospect_target_arr: Money,

    pub cre_variance: f64,
    pub atr_variance: f64,
    pub tier1_variance: f64,
    pub tier2_variance: f64,
    pub renewal_concentration_max: f64,
    pub capacity_variance_percent: f64,

    pub score_weight_continuity: f64,
    pub score_weight_geography: f64,
    pub score_weight_team_tier: f64,

    pub cre_count_threshold: u32,
    pub renewal_soon_window_days: i64,
    pub recent_change_window_days: i64,

    pub territory_mappings: HashMap<String, String>,

    pub thresholds: Option<Thresholds>,
}

impl Configuration {
    /// Rejects a configuration with out-of-range variance percentages or
    /// negative score weights before it reaches the solver, where such
    /// values would otherwise surface as an opaque infeasible problem.
    pub fn validate(&self) -> crate::CoreResult<()> {
        for (name, value) in [
            ("cre_variance", self.cre_variance),
            ("atr_variance", self.atr_variance),
            ("tier1_variance", self.tier1_variance),
            ("tier2_variance", self.tier2_variance),
            ("capacity_variance_percent", self.capacity_variance_percent),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(crate::CoreError::Config(format!("{name} must be between 0.0 and 1.0, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.renewal_concentration_max) {
            return Err(crate::CoreError::Config(format!(
                "renewal_concentration_max must be between 0.0 and 1.0, got {}",
                self.renewal_concentration_max
            )));
        }
        for (name, value) in [
            ("score_weight_continuity", self.score_weight_continuity),
            ("score_weight_geography", self.score_weight_geography),
            ("score_weight_team_tier", self.score_weight_team_tier),
        ] {
            if value < 0.0 {
                return Err(crate::CoreError::Config(format!("{name} must not be negative, got {value}")));
            }
        }
        Ok(())
    }

    /// Normalised scoring weights, guaranteed to sum to 1.0.
    pub fn normalized_score_weights(&self) -> (f64, f64, f64) {
        let sum = self.score_weight_continuity + self.score_weight_geography + self.score_weight_team_tier;
        if sum <= 0.0 {
            return (0.4, 0.35, 0.25);
        }
        (
            self.score_weight_continuity / sum,
            self.score_weight_geography / sum,
            self.score_weight_team_tier / sum,
        )
    }

    pub fn thresholds_stale(&self) -> bool {
        self.thresholds
            .as_ref()
            .map(|t| t.last_calculated_at.is_none())
            .unwrap_or(true)
    }
}

/// Materialised per parent account for use downstream of aggregation (§4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedAccount {
    pub account: Account,
    pub aggregated_arr: Money,
    pub aggregated_atr: Money,
    pub child_ids: HashSet<AccountId>,
}

impl AggregatedAccount {
    /// Preference order: `hierarchy_bookings_arr_converted`, else
    /// `calculated_arr`, else `arr`. Non-finite inputs are already coerced
    /// to zero by [`Money::coerce`] at construction time.
    pub fn effective_arr(account: &Account) -> Money {
        account
            .hierarchy_bookings_arr_converted
            .or(account.calculated_arr)
            .unwrap_or(account.arr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictRisk {
    Low,
    Medium,
    High,
}

/// Ephemeral output of one `generate` pass. Lives only within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentProposal {
    pub account_id: AccountId,
    pub current_owner_id: Option<RepId>,
    pub proposed_owner_id: RepId,
    pub rule_applied: String,
    pub rationale: String,
    pub warnings: Vec<String>,
    pub conflict_risk: ConflictRisk,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(v: f64) -> Money {
        Money::coerce(v)
    }

    #[test]
    fn tier_derive_prefers_expansion() {
        assert_eq!(Tier::derive(Some(Tier::T1), Some(Tier::T3)), Tier::T1);
        assert_eq!(Tier::derive(None, Some(Tier::T3)), Tier::T3);
        assert_eq!(Tier::derive(None, None), Tier::None);
    }

    #[test]
    fn tier_adjacency() {
        assert!(Tier::T1.is_adjacent(Tier::T2));
        assert!(!Tier::T1.is_adjacent(Tier::T3));
        assert!(!Tier::T1.is_adjacent(Tier::None));
    }

    #[test]
    fn opportunity_type_normalization_is_exact_match_only() {
        assert!(counts_as_renewal(&normalize_opportunity_type("Renewals")));
        assert!(counts_as_renewal(&normalize_opportunity_type("renewals ")));
        assert!(!counts_as_renewal(&normalize_opportunity_type("Renewal")));
        assert!(!counts_as_renewal(&normalize_opportunity_type("Expansion")));
    }

    #[test]
    fn is_customer_uses_hierarchy_arr_only() {
        let mut account = sample_account();
        account.hierarchy_arr = money(0.0);
        assert!(!account.is_customer());
        account.hierarchy_arr = money(1.0);
        assert!(account.is_customer());
    }

    #[test]
    fn effective_arr_preference_order() {
        let mut account = sample_account();
        account.arr = money(100.0);
        account.calculated_arr = None;
        account.hierarchy_bookings_arr_converted = None;
        assert_eq!(AggregatedAccount::effective_arr(&account).value(), 100.0);

        account.calculated_arr = Some(money(200.0));
        assert_eq!(AggregatedAccount::effective_arr(&account).value(), 200.0);

        account.hierarchy_bookings_arr_converted = Some(money(300.0));
        assert_eq!(AggregatedAccount::effective_arr(&account).value(), 300.0);
    }

    #[test]
    fn band_relaxed_widens_symmetrically() {
        let band = Band {
            min: 90.0,
            target: 100.0,
            max: 150.0,
        };
        let relaxed = band.relaxed(1.5);
        assert_eq!(relaxed.target, 100.0);
        assert!((relaxed.min - 85.0).abs() < 1e-9);
        assert!((relaxed.max - 175.0).abs() < 1e-9);
    }

    #[test]
    fn configuration_weight_normalization() {
        let mut cfg = sample_configuration();
        cfg.score_weight_continuity = 4.0;
        cfg.score_weight_geography = 3.5;
        cfg.score_weight_team_tier = 2.5;
        let (wc, wg, wt) = cfg.normalized_score_weights();
        assert!((wc - 0.4).abs() < 1e-9);
        assert!((wg - 0.35).abs() < 1e-9);
        assert!((wt - 0.25).abs() < 1e-9);
    }

    #[test]
    fn thresholds_stale_when_absent() {
        let cfg = sample_configuration();
        assert!(cfg.thresholds_stale());
    }

    fn sample_account() -> Account {
        Account {
            account_id: AccountId::from("a-1"),
            name: "Acme".into(),
            ultimate_parent_id: None,
            arr: money(0.0),
            atr: money(0.0),
            pipeline_value: money(0.0),
            hierarchy_arr: money(0.0),
            hierarchy_bookings_arr_converted: None,
            calculated_arr: None,
            tier: Tier::None,
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
        }
    }

    fn sample_configuration() -> Configuration {
        Configuration {
            customer_target_arr: money(0.0),
            customer_max_arr: money(0.0),
            prospect_target_arr: money(0.0),
            cre_variance: 0.1,
            atr_variance: 0.1,
            tier1_variance: 0.1,
            tier2_variance: 0.1,
            renewal_concentration_max: 0.3,
            capacity_variance_percent: 0.3,
            score_weight_continuity: 0.4,
            score_weight_geography: 0.35,
            score_weight_team_tier: 0.25,
            cre_count_threshold: 2,
            renewal_soon_window_days: 90,
            recent_change_window_days: 60,
            territory_mappings: HashMap::new(),
            thresholds: None,
        }
    }
}
