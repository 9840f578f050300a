//! Orchestrator error enum (§7). The orchestrator is the single boundary
//! where throws become user-visible failures — everything upstream
//! (scoring, the problem builder, the rationale generator, the threshold
//! calculator) returns a result plus warnings instead.

use terra_algo::{ScoringError, SolverError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error(
        "projected ARR imbalance: rep {rep_id} would carry {projected:.0} against a target of {target:.0} ({overload_percent:.1}% over)"
    )]
    ImbalanceWarning {
        rep_id: String,
        projected: f64,
        target: f64,
        overload_percent: f64,
    },

    #[error("run was cancelled before any writes were made")]
    Cancelled,
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
