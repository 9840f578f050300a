//! Solver wrapper and layered dispatch (§4.6).

pub mod dispatch;
pub mod in_process;
pub mod types;

pub use dispatch::{consecutive_failures, primary_disabled, solve, DispatchConfig, ROUTE_BY_SIZE_THRESHOLD};
pub use types::{SolveLayer, SolveResult, SolveStatus};
