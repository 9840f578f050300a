//! Shared error taxonomy for everything that talks to a solver backend,
//! in-process or remote.

use thiserror::Error;

/// Exit codes returned by the remote solver service in its JSON envelope
/// (distinct from in-process MIP solve status — see `terra_algo::solver::SolveStatus`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success (check status in solution for optimality).
    Success = 0,
    /// Invalid input (malformed LP text, missing fields).
    InvalidInput = 1,
    /// Solver error (license, numerical issues).
    SolverError = 2,
    /// Timeout.
    Timeout = 3,
}

impl ExitCode {
    /// Convert from a raw status code to an [`ExitCode`].
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => ExitCode::Success,
            1 => ExitCode::InvalidInput,
            3 => ExitCode::Timeout,
            _ => ExitCode::SolverError,
        }
    }

    /// Whether this code indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, ExitCode::Success)
    }
}

/// Errors from dispatching to or communicating with a solver.
///
/// Named by failure kind, not by backend, so callers can match on
/// `MemoryAbort` regardless of whether it came from HiGHS or CBC.
#[derive(Error, Debug)]
pub enum SolverError {
    /// The backend's native code aborted (segfault, OOM-kill, allocator
    /// panic) rather than returning a normal infeasible/optimal result.
    #[error("solver memory abort: {0}")]
    MemoryAbort(String),

    /// The solver ran to its time limit without confirming optimality.
    #[error("solver timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// The solver proved the problem has no feasible solution.
    #[error("solver reported infeasible")]
    Infeasible,

    /// The remote solver service returned a non-2xx status.
    #[error("remote solver returned HTTP {status}: {body}")]
    RemoteHttp { status: u16, body: String },

    /// The remote solver response body could not be parsed as the expected JSON shape.
    #[error("remote solver response parse error: {0}")]
    RemoteParse(String),

    /// Could not reach the remote solver at all (DNS, connect, TLS, abort).
    #[error("remote solver unreachable: {0}")]
    RemoteUnreachable(String),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller's [`crate::CancellationToken`] tripped before (or during)
    /// the call.
    #[error("solve was cancelled")]
    Cancelled,

    /// Backend-specific setup or solve failure not covered above.
    #[error("solver error: {0}")]
    Other(String),
}

/// Result type alias for solver operations.
pub type SolverResult<T> = Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_from_raw_defaults_to_solver_error() {
        assert_eq!(ExitCode::from_raw(0), ExitCode::Success);
        assert_eq!(ExitCode::from_raw(3), ExitCode::Timeout);
        assert_eq!(ExitCode::from_raw(47), ExitCode::SolverError);
    }

    #[test]
    fn memory_abort_display() {
        let err = SolverError::MemoryAbort("SIGSEGV".into());
        assert!(err.to_string().contains("memory abort"));
    }

    #[test]
    fn remote_http_display_includes_status() {
        let err = SolverError::RemoteHttp {
            status: 503,
            body: "overloaded".into(),
        };
        assert!(err.to_string().contains("503"));
    }
}
