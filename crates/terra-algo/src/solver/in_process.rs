//! In-process MIP solve via `good_lp`, one function per backend (§4.6
//! Layer 2/3). Each builds its `good_lp` model dynamically from our
//! backend-agnostic [`crate::lp_format::LpModel`] rather than hand-writing
//! the constraint set twice.

use std::collections::HashMap;
use std::time::Instant;

use good_lp::{variable, Expression, ProblemVariables, Solution, SolverModel, Variable};
use terra_core::{AccountId, RepId};

use crate::lp_format::{LpModel, Relation};
use crate::problem::VariableIndex;
use crate::solver::types::{SolveLayer, SolveResult, SolveStatus};
use terra_solver_common::SolverError;

/// MIP relative gap passed to the backend. Without this option the
/// primary solver aborts deterministically on problems with many Big-M
/// slacks (§4.6) — this is not optional.
pub const MIP_REL_GAP: f64 = 0.01;

fn build_variables(model: &LpModel) -> (ProblemVariables, HashMap<String, Variable>) {
    let mut vars = ProblemVariables::new();
    let mut handles = HashMap::new();

    for name in &model.binaries {
        let handle = vars.add(variable().binary());
        handles.insert(name.clone(), handle);
    }
    for bound in &model.bounds {
        if handles.contains_key(&bound.var) {
            continue;
        }
        let handle = vars.add(variable().min(bound.lower).max(bound.upper));
        handles.insert(bound.var.clone(), handle);
    }

    (vars, handles)
}

fn build_expression(terms: &[(f64, String)], handles: &HashMap<String, Variable>) -> Expression {
    let mut expr = Expression::from(0.0);
    for (coefficient, name) in terms {
        if let Some(handle) = handles.get(name) {
            expr += *coefficient * *handle;
        }
    }
    expr
}

fn add_constraints<S: SolverModel>(mut configured: S, model: &LpModel, handles: &HashMap<String, Variable>) -> S {
    for constraint in &model.constraints {
        let lhs = build_expression(&constraint.terms, handles);
        let built = match constraint.relation {
            Relation::Eq => lhs.eq(constraint.rhs),
            Relation::Le => lhs.leq(constraint.rhs),
            Relation::Ge => lhs.geq(constraint.rhs),
        };
        configured = configured.with(built);
    }
    configured
}

fn extract(
    handles: &HashMap<String, Variable>,
    solution: &impl Solution,
    objective: &Expression,
    index: &VariableIndex,
    layer: SolveLayer,
    started: Instant,
) -> SolveResult {
    let mut assignments: HashMap<AccountId, HashMap<RepId, f64>> = HashMap::new();
    let mut slack_values = HashMap::new();
    for (name, handle) in handles {
        let value = solution.value(*handle);
        if let Some((account_id, rep_id)) = index.resolve_assignment_var(name) {
            assignments.entry(account_id).or_default().insert(rep_id, value);
        } else {
            slack_values.insert(name.clone(), value);
        }
    }

    SolveResult {
        status: SolveStatus::Optimal,
        layer,
        objective: solution.eval(objective),
        assignments,
        slack_values,
        solve_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        error: None,
    }
}

/// Solve `model` with the HiGHS backend (Layer 2). Sets the MIP relative
/// gap explicitly — empirically, without it, HiGHS aborts deterministically
/// on problems with many Big-M slacks; with it, the same problems solve in
/// ≲ 500 ms (§4.6).
#[cfg(feature = "solver-highs")]
pub fn solve_with_highs(model: &LpModel, index: &VariableIndex) -> Result<SolveResult, SolverError> {
    let started = Instant::now();
    let (vars, handles) = build_variables(model);
    let objective = build_expression(&model.objective, &handles);

    let mut configured = vars.maximise(objective.clone()).using(good_lp::highs);
    configured.set_mip_gap(MIP_REL_GAP as f32);
    let configured = add_constraints(configured, model, &handles);

    let solution = configured.solve().map_err(|e| SolverError::MemoryAbort(e.to_string()))?;
    Ok(extract(&handles, &solution, &objective, index, SolveLayer::PrimaryInProcess, started))
}

/// Solve `model` with the CBC backend (Layer 3) — architecturally distinct
/// from HiGHS on purpose: a crash native to one solver's FFI must not also
/// disable the other.
#[cfg(feature = "solver-cbc")]
pub fn solve_with_cbc(model: &LpModel, index: &VariableIndex) -> Result<SolveResult, SolverError> {
    let started = Instant::now();
    let (vars, handles) = build_variables(model);
    let objective = build_expression(&model.objective, &handles);

    let configured = vars.maximise(objective.clone()).using(good_lp::coin_cbc);
    let configured = add_constraints(configured, model, &handles);

    let solution = configured.solve().map_err(|e| SolverError::MemoryAbort(e.to_string()))?;
    Ok(extract(&handles, &solution, &objective, index, SolveLayer::FallbackInProcess, started))
}
