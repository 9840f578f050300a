//! # terra-core: Account Assignment Domain Model
//!
//! Provides the fundamental data structures for the account assignment
//! engine: accounts, sales reps, opportunities, configuration, and the
//! derived aggregates the rest of the workspace builds on.
//!
//! ## Design Philosophy
//!
//! Optional numeric fields on the source records are a common failure mode:
//! "is this zero because it truly is, or because parsing silently
//! defaulted it?" This crate makes that coercion explicit once, at
//! construction (see [`money::Money::coerce`]), and never again downstream.
//! Ids are newtypes ([`ids::AccountId`], [`ids::RepId`],
//! [`ids::OpportunityId`]) so a rep id can't be passed where an account id
//! is expected.
//!
//! ## Quick Start
//!
//! ```
//! use terra_core::domain::{Account, Tier};
//! use terra_core::ids::AccountId;
//! use terra_core::money::Money;
//!
//! let account = Account {
//!     account_id: AccountId::from("acc-1"),
//!     name: "Acme Corp".to_string(),
//!     ultimate_parent_id: None,
//!     arr: Money::coerce(250_000.0),
//!     atr: Money::coerce(0.0),
//!     pipeline_value: Money::coerce(0.0),
//!     hierarchy_arr: Money::coerce(250_000.0),
//!     hierarchy_bookings_arr_converted: None,
//!     calculated_arr: None,
//!     tier: Tier::T2,
//!     geo: Some("AMER".into()),
//!     sales_territory: None,
//!     employee_count: None,
//!     enterprise_vs_commercial: None,
//!     industry: None,
//!     pe_firm: None,
//!     owner_id: None,
//!     new_owner_id: None,
//!     owner_change_date: None,
//!     owners_lifetime: 0,
//!     exclude_from_reassignment: false,
//!     cre_count: 0,
//!     cre_risk: false,
//!     renewal_date: None,
//! };
//!
//! assert!(account.is_parent());
//! assert!(account.is_customer());
//! ```

pub mod domain;
pub mod error;
pub mod fiscal;
pub mod ids;
pub mod money;

pub use domain::{
    AggregatedAccount, Account, AssignmentProposal, BalanceDimension, Band, ConflictRisk,
    Configuration, Opportunity, SalesRep, Thresholds, Tier, counts_as_renewal,
    normalize_opportunity_type,
};
pub use error::{CoreError, CoreResult};
pub use fiscal::{quarter_of_date, quarter_of_month, Quarter};
pub use ids::{AccountId, OpportunityId, RepId};
pub use money::Money;
