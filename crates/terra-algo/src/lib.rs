//! # terra-algo: Account Assignment Algorithms
//!
//! Scoring, stability-lock classification, threshold calculation, the
//! LP/MIP problem builder, the layered solver wrapper, and the waterfall
//! heuristic fallback for the account assignment engine.
//!
//! ## Pipeline
//!
//! 0. [`aggregate::aggregate_accounts`] rolls raw accounts + opportunities
//!    up into per-parent [`terra_core::AggregatedAccount`]s.
//! 1. [`thresholds::calculate_thresholds`] derives per-rep capacity bands.
//! 2. [`locks::classify_lock`] pins accounts that must not move.
//! 3. [`problem::build_problem`] builds the MIP over the remaining accounts.
//! 4. [`solver::solve`] dispatches it across the layered solver chain
//!    (§4.6), falling back to [`waterfall::run_waterfall`] when every layer
//!    fails.
//! 5. [`rationale::format_rationale`] produces the stable, parseable
//!    explanation string for each assignment.

pub mod aggregate;
pub mod error;
pub mod locks;
pub mod lp_format;
pub mod problem;
pub mod rationale;
pub mod scoring;
pub mod solver;
pub mod thresholds;
pub mod waterfall;

pub use aggregate::aggregate_accounts;
pub use error::{ScoringError, ScoringResult};
pub use locks::{classify_lock, LockCounts, LockType, StabilityLock};
pub use problem::{build_problem, build_problem_checked, BuiltProblem, VariableIndex};
pub use rationale::{format_rationale, parse_priority_code};
pub use scoring::{composite_score, continuity_score, geography_score, rank_reps_for_account, team_tier_score};
pub use solver::{DispatchConfig, SolveLayer, SolveResult, SolveStatus};
pub use terra_solver_common::{CancellationToken, SolverError};
pub use thresholds::{calculate_thresholds, compute_band};
pub use waterfall::{classify_priority, run_waterfall, PriorityCode, WaterfallAssignment};
