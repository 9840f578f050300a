//! Stability lock classifier (§4.3).
//!
//! Evaluates the six lock rules in priority order, first match wins. The
//! classifier is the sole authority on which lock applies to an account;
//! downstream code treats its result as opaque.

use chrono::{DateTime, NaiveDate, Utc};
use terra_core::{Account, Configuration, RepId, SalesRep};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum LockType {
    ManualLock,
    BackfillMigration,
    CreRisk,
    RenewalSoon,
    PeFirm,
    RecentChange,
}

impl LockType {
    pub fn code(self) -> &'static str {
        match self {
            LockType::ManualLock => "manual_lock",
            LockType::BackfillMigration => "backfill_migration",
            LockType::CreRisk => "cre_risk",
            LockType::RenewalSoon => "renewal_soon",
            LockType::PeFirm => "pe_firm",
            LockType::RecentChange => "recent_change",
        }
    }
}

use serde::{Deserialize, Serialize};

/// Result of classifying a single account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StabilityLock {
    pub is_locked: bool,
    pub lock_type: Option<LockType>,
    pub target_rep_id: Option<RepId>,
    pub reason: String,
}

impl StabilityLock {
    fn unlocked() -> Self {
        Self {
            is_locked: false,
            lock_type: None,
            target_rep_id: None,
            reason: String::new(),
        }
    }

    fn locked(lock_type: LockType, target_rep_id: Option<RepId>, reason: String) -> Self {
        Self {
            is_locked: true,
            lock_type: Some(lock_type),
            target_rep_id,
            reason,
        }
    }
}

/// Classify a single account's stability lock status.
///
/// `reps` is the full rep roster (needed to resolve backfill targets and PE
/// firm affinities); `now` is the evaluation instant for the renewal/recent
/// change windows.
pub fn classify_lock(
    account: &Account,
    reps: &[SalesRep],
    config: &Configuration,
    now: DateTime<Utc>,
) -> StabilityLock {
    if account.exclude_from_reassignment {
        return StabilityLock::locked(
            LockType::ManualLock,
            account.owner_id.clone(),
            "exclude_from_reassignment is set".to_string(),
        );
    }

    if let Some(owner_id) = &account.owner_id {
        if let Some(owner) = reps.iter().find(|r| &r.rep_id == owner_id) {
            if owner.is_backfill_source {
                let target = owner.backfill_target_rep_id.clone();
                return StabilityLock::locked(
                    LockType::BackfillMigration,
                    target,
                    format!("current owner {} is a backfill source", owner.name),
                );
            }
        }
    }

    if account.cre_risk || account.cre_count >= config.cre_count_threshold {
        return StabilityLock::locked(
            LockType::CreRisk,
            account.owner_id.clone(),
            format!(
                "cre_count {} >= threshold {} or cre_risk flag set",
                account.cre_count, config.cre_count_threshold
            ),
        );
    }

    if let Some(renewal_date) = earliest_renewal(account, now) {
        let window_end = now.date_naive() + chrono::Duration::days(config.renewal_soon_window_days);
        if renewal_date <= window_end {
            return StabilityLock::locked(
                LockType::RenewalSoon,
                account.owner_id.clone(),
                format!("earliest renewal {} is within the renewal window", renewal_date),
            );
        }
    }

    if let Some(pe_firm) = &account.pe_firm {
        if let Some(affine_rep) = reps.iter().find(|r| r.pe_firms.iter().any(|f| f == pe_firm)) {
            return StabilityLock::locked(
                LockType::PeFirm,
                Some(affine_rep.rep_id.clone()),
                format!("account's PE firm {} matches rep affinity", pe_firm),
            );
        }
    }

    if let Some(changed_at) = account.owner_change_date {
        let window_start = now - chrono::Duration::days(config.recent_change_window_days);
        if changed_at >= window_start {
            return StabilityLock::locked(
                LockType::RecentChange,
                account.owner_id.clone(),
                format!("owner changed on {} within the stability window", changed_at.date_naive()),
            );
        }
    }

    StabilityLock::unlocked()
}

/// Earliest renewal-relevant date for an account — currently just
/// `renewal_date`; a thin wrapper so the window comparison has one place to
/// change if a second date source is added.
fn earliest_renewal(account: &Account, _now: DateTime<Utc>) -> Option<NaiveDate> {
    account.renewal_date
}

/// Counts per lock type, feeding §4.8 diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockCounts {
    pub manual_lock: usize,
    pub backfill_migration: usize,
    pub cre_risk: usize,
    pub renewal_soon: usize,
    pub pe_firm: usize,
    pub recent_change: usize,
    pub unlocked: usize,
}

impl LockCounts {
    pub fn record(&mut self, lock: &StabilityLock) {
        match lock.lock_type {
            Some(LockType::ManualLock) => self.manual_lock += 1,
            Some(LockType::BackfillMigration) => self.backfill_migration += 1,
            Some(LockType::CreRisk) => self.cre_risk += 1,
            Some(LockType::RenewalSoon) => self.renewal_soon += 1,
            Some(LockType::PeFirm) => self.pe_firm += 1,
            Some(LockType::RecentChange) => self.recent_change += 1,
            None => self.unlocked += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_core::{AccountId, Money, Tier};

    fn base_account() -> Account {
        Account {
            account_id: AccountId::from("a-1"),
            name: "Acme".into(),
            ultimate_parent_id: None,
            arr: Money::coerce(0.0),
            atr: Money::coerce(0.0),
            pipeline_value: Money::coerce(0.0),
            hierarchy_arr: Money::coerce(0.0),
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

    fn base_config() -> Configuration {
        Configuration {
            customer_target_arr: Money::coerce(0.0),
            customer_max_arr: Money::coerce(0.0),
            prospect_target_arr: Money::coerce(0.0),
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
            territory_mappings: Default::default(),
            thresholds: None,
        }
    }

    #[test]
    fn manual_lock_wins_over_everything() {
        let mut account = base_account();
        account.exclude_from_reassignment = true;
        account.cre_risk = true;
        let lock = classify_lock(&account, &[], &base_config(), Utc::now());
        assert_eq!(lock.lock_type, Some(LockType::ManualLock));
    }

    #[test]
    fn backfill_migration_before_cre_risk() {
        let mut account = base_account();
        account.owner_id = Some(RepId::from("r-1"));
        account.cre_risk = true;
        let mut source = sample_rep("r-1");
        source.is_backfill_source = true;
        source.backfill_target_rep_id = Some(RepId::from("r-2"));
        let lock = classify_lock(&account, &[source], &base_config(), Utc::now());
        assert_eq!(lock.lock_type, Some(LockType::BackfillMigration));
        assert_eq!(lock.target_rep_id, Some(RepId::from("r-2")));
    }

    #[test]
    fn cre_risk_by_count_threshold() {
        let mut account = base_account();
        account.cre_count = 5;
        let lock = classify_lock(&account, &[], &base_config(), Utc::now());
        assert_eq!(lock.lock_type, Some(LockType::CreRisk));
    }

    #[test]
    fn renewal_soon_within_window() {
        let mut account = base_account();
        let now = Utc::now();
        account.renewal_date = Some(now.date_naive() + chrono::Duration::days(10));
        let lock = classify_lock(&account, &[], &base_config(), now);
        assert_eq!(lock.lock_type, Some(LockType::RenewalSoon));
    }

    #[test]
    fn renewal_outside_window_is_unlocked() {
        let mut account = base_account();
        let now = Utc::now();
        account.renewal_date = Some(now.date_naive() + chrono::Duration::days(400));
        let lock = classify_lock(&account, &[], &base_config(), now);
        assert!(!lock.is_locked);
    }

    #[test]
    fn pe_firm_affinity_match() {
        let mut account = base_account();
        account.pe_firm = Some("Vista".into());
        let mut rep = sample_rep("r-1");
        rep.pe_firms = vec!["Vista".into()];
        let lock = classify_lock(&account, &[rep], &base_config(), Utc::now());
        assert_eq!(lock.lock_type, Some(LockType::PeFirm));
        assert_eq!(lock.target_rep_id, Some(RepId::from("r-1")));
    }

    #[test]
    fn recent_change_within_window() {
        let mut account = base_account();
        let now = Utc::now();
        account.owner_change_date = Some(now - chrono::Duration::days(5));
        let lock = classify_lock(&account, &[], &base_config(), now);
        assert_eq!(lock.lock_type, Some(LockType::RecentChange));
    }

    #[test]
    fn no_rule_matches_is_unlocked() {
        let account = base_account();
        let lock = classify_lock(&account, &[], &base_config(), Utc::now());
        assert!(!lock.is_locked);
        assert!(lock.lock_type.is_none());
    }

    fn sample_rep(id: &str) -> SalesRep {
        SalesRep {
            rep_id: RepId::from(id),
            name: id.to_string(),
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
}
