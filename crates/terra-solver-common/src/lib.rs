//! Remote solver protocol and shared solver error taxonomy.
//!
//! This crate defines the wire shapes for the remote solver service (§4.6
//! Layer 4 of the assignment engine's solver dispatch) and the error
//! taxonomy shared by every solver layer, in-process or remote.
//!
//! # Protocol
//!
//! ```text
//! terra-algo (caller) ──POST text/plain (LP document)──> remote solver service
//!                      <────────────── JSON {status, objectiveValue, columns, solveTimeMs} ──
//! ```
//!
//! The request is the standard LP-format text produced by the problem
//! builder; the response is parsed into [`solution::RemoteSolution`].
//! Status mapping onto the wrapper's own solve-status enum happens at the
//! call site in `terra-algo`, not in this crate — this crate only speaks
//! the wire shape.

pub mod cancellation;
pub mod error;
pub mod problem;
pub mod remote;
pub mod solution;

pub use cancellation::CancellationToken;
pub use error::{ExitCode, SolverError, SolverResult};
pub use problem::RemoteProblem;
pub use remote::RemoteSolverClient;
pub use solution::{ColumnValue, RemoteSolution, RemoteStatus};
