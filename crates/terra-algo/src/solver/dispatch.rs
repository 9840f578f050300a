//! Layered solver dispatch (§4.6).
//!
//! ```text
//! idle -> loading_primary -> primary_ok -> solving -> solved | aborted(memory)
//! aborted(memory) -> reset_primary -> (retry_on_fallback) -> solved | failed
//! consecutive_failures >= 2 => primary_disabled (sticky until process restart)
//! ```

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use terra_core::RepId;
use terra_solver_common::{CancellationToken, RemoteProblem, RemoteSolverClient, RemoteStatus, SolverError};

use crate::problem::{BuiltProblem, MAX_IN_PROCESS_VARIABLES};
use crate::solver::types::{SolveLayer, SolveResult, SolveStatus};

/// Account count above which Layer 0 routes straight to the remote solver.
pub const ROUTE_BY_SIZE_THRESHOLD: usize = 3_000;
/// Consecutive Layer-2 failures before it is disabled for the process lifetime.
const MAX_CONSECUTIVE_FAILURES: u32 = 2;

static CONSECUTIVE_FAILURES: AtomicU32 = AtomicU32::new(0);
static PRIMARY_DISABLED: AtomicBool = AtomicBool::new(false);

/// Process-global state of the primary in-process solver, exposed for
/// diagnostics and tests. Resets only on process restart.
pub fn primary_disabled() -> bool {
    PRIMARY_DISABLED.load(Ordering::SeqCst)
}

pub fn consecutive_failures() -> u32 {
    CONSECUTIVE_FAILURES.load(Ordering::SeqCst)
}

fn record_primary_failure() {
    let failures = CONSECUTIVE_FAILURES.fetch_add(1, Ordering::SeqCst) + 1;
    if failures >= MAX_CONSECUTIVE_FAILURES {
        PRIMARY_DISABLED.store(true, Ordering::SeqCst);
    }
}

fn record_primary_success() {
    CONSECUTIVE_FAILURES.store(0, Ordering::SeqCst);
}

/// Test-only hook to restore process-global state between cases.
#[cfg(test)]
pub fn reset_global_state_for_test() {
    CONSECUTIVE_FAILURES.store(0, Ordering::SeqCst);
    PRIMARY_DISABLED.store(false, Ordering::SeqCst);
}

/// Configuration for the layered dispatch, sourced from `REMOTE_SOLVER_URL`,
/// `USE_REMOTE_FOR_LARGE`, `ALWAYS_USE_REMOTE`.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub remote_solver_url: Option<String>,
    pub use_remote_for_large: bool,
    pub always_use_remote: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            remote_solver_url: None,
            use_remote_for_large: true,
            always_use_remote: false,
        }
    }
}

fn map_remote_status(status: RemoteStatus) -> SolveStatus {
    match status {
        RemoteStatus::Optimal => SolveStatus::Optimal,
        RemoteStatus::Infeasible => SolveStatus::Infeasible,
        RemoteStatus::TimeLimit => SolveStatus::Timeout,
        RemoteStatus::Error => SolveStatus::Error,
    }
}

fn solve_remote(problem: &BuiltProblem, url: &str, cancel: &CancellationToken) -> Result<SolveResult, SolverError> {
    let started = std::time::Instant::now();
    let (lp_text, _) = crate::lp_format::emit(&problem.model);
    let client = RemoteSolverClient::new(url);
    let remote_solution = client.solve(&RemoteProblem::new(lp_text), cancel)?;

    let mut assignments = std::collections::HashMap::new();
    let mut slack_values = std::collections::HashMap::new();
    for (name, column) in &remote_solution.columns {
        if let Some((account_id, rep_id)) = problem.index.resolve_assignment_var(name) {
            assignments
                .entry(account_id)
                .or_insert_with(std::collections::HashMap::<RepId, f64>::new)
                .insert(rep_id, column.primal);
        } else {
            slack_values.insert(name.clone(), column.primal);
        }
    }

    let mut result = SolveResult {
        status: map_remote_status(remote_solution.status),
        layer: SolveLayer::Remote,
        objective: remote_solution.objective_value,
        assignments,
        slack_values,
        solve_time_ms: remote_solution
            .solve_time_ms
            .max(started.elapsed().as_secs_f64() * 1000.0),
        error: remote_solution.error,
    };

    // §7: a timed-out solve with at least one winning binary variable is
    // feasible-but-suboptimal, not a failure — only a timeout with nothing
    // above threshold behaves like a memory abort.
    if result.status == SolveStatus::Timeout && !result.extract_winners().is_empty() {
        tracing::warn!("remote solver hit the time limit but returned a usable partial solution, treating as feasible");
        result.status = SolveStatus::Feasible;
    }

    Ok(result)
}

/// Run the full layered dispatch over a built problem.
///
/// `account_count` drives Layer 0's route-by-size decision; it is passed
/// separately from `problem` because the caller may be dispatching a
/// sub-problem (e.g. one region) smaller than the full build.
pub fn solve(
    problem: &BuiltProblem,
    account_count: usize,
    config: &DispatchConfig,
    cancel: &CancellationToken,
) -> Result<SolveResult, SolverError> {
    if cancel.is_cancelled() {
        return Err(SolverError::Cancelled);
    }
    if config.always_use_remote || account_count > ROUTE_BY_SIZE_THRESHOLD {
        let url = config
            .remote_solver_url
            .as_deref()
            .ok_or_else(|| SolverError::Other("remote solver required but REMOTE_SOLVER_URL is unset".into()))?;
        return solve_remote(problem, url, cancel);
    }

    let too_large = problem.variable_count() > MAX_IN_PROCESS_VARIABLES || problem.is_too_large_for_in_process();
    if !too_large && !primary_disabled() {
        #[cfg(feature = "solver-highs")]
        {
            match crate::solver::in_process::solve_with_highs(&problem.model, &problem.index) {
                Ok(result) => {
                    record_primary_success();
                    return Ok(result);
                }
                Err(SolverError::MemoryAbort(msg)) => {
                    tracing::warn!(reason = %msg, "primary in-process solver aborted, falling back to layer 3");
                    record_primary_failure();
                }
                Err(other) => return Err(other),
            }
        }
    }

    #[cfg(feature = "solver-cbc")]
    {
        match crate::solver::in_process::solve_with_cbc(&problem.model, &problem.index) {
            Ok(result) => return Ok(result),
            Err(SolverError::MemoryAbort(_)) if config.use_remote_for_large => {}
            Err(other) => return Err(other),
        }
    }

    if let Some(url) = config.remote_solver_url.as_deref() {
        return solve_remote(problem, url, cancel);
    }

    Err(SolverError::Other("all solver layers exhausted with no remote endpoint configured".into()))
}
