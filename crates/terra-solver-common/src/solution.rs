//! Wire response from the remote solver service.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status string as returned by the remote solver, before mapping to the
/// wrapper's `SolveStatus` (done at the call site, not here — see
/// `terra_algo::solver::dispatch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteStatus {
    Optimal,
    Infeasible,
    #[serde(rename = "Time limit")]
    TimeLimit,
    Error,
}

/// Value of a single solved column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnValue {
    #[serde(rename = "Primal")]
    pub primal: f64,
}

/// JSON envelope returned by the remote solver service (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSolution {
    pub status: RemoteStatus,
    #[serde(rename = "objectiveValue")]
    pub objective_value: f64,
    pub columns: HashMap<String, ColumnValue>,
    #[serde(rename = "solveTimeMs")]
    pub solve_time_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemoteSolution {
    /// Value of a decision variable by name, or 0.0 if absent.
    pub fn value_of(&self, var_name: &str) -> f64 {
        self.columns.get(var_name).map(|c| c.primal).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_spec_shaped_response() {
        let body = r#"{
            "status": "Optimal",
            "objectiveValue": 123.5,
            "columns": { "x_a1_r1": { "Primal": 1.0 } },
            "solveTimeMs": 842.0
        }"#;
        let parsed: RemoteSolution = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, RemoteStatus::Optimal);
        assert_eq!(parsed.value_of("x_a1_r1"), 1.0);
        assert_eq!(parsed.value_of("missing"), 0.0);
    }

    #[test]
    fn deserializes_time_limit_status() {
        let body = r#"{
            "status": "Time limit",
            "objectiveValue": 0.0,
            "columns": {},
            "solveTimeMs": 300000.0,
            "error": "time limit reached"
        }"#;
        let parsed: RemoteSolution = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, RemoteStatus::TimeLimit);
        assert_eq!(parsed.error.as_deref(), Some("time limit reached"));
    }
}
