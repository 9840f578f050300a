//! HTTP client for the remote solver service (§4.6 Layer 4).
//!
//! A stateless endpoint: POST the LP-format document as `text/plain`,
//! get back the JSON envelope in [`crate::solution::RemoteSolution`].

use std::time::Duration;

use crate::cancellation::CancellationToken;
use crate::error::SolverError;
use crate::problem::RemoteProblem;
use crate::solution::RemoteSolution;

/// Hard timeout for the remote solve, matching the 5-minute ceiling.
pub const REMOTE_SOLVE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Client for the remote solver HTTP endpoint.
pub struct RemoteSolverClient {
    url: String,
    agent: ureq::Agent,
}

impl RemoteSolverClient {
    /// Build a client against the given endpoint URL, with the standard
    /// 5-minute timeout applied to both connect and the full call.
    pub fn new(url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REMOTE_SOLVE_TIMEOUT)
            .build();
        Self {
            url: url.into(),
            agent,
        }
    }

    #[cfg(test)]
    fn with_agent(url: impl Into<String>, agent: ureq::Agent) -> Self {
        Self {
            url: url.into(),
            agent,
        }
    }

    /// Send the LP document and parse the response.
    ///
    /// Non-2xx, connection failure, and body-parse failure are all
    /// reported through [`SolverError`] so the caller can fall back one layer.
    /// `cancel` is checked once before the call is sent; a run cancelled
    /// mid-flight is still bounded by [`REMOTE_SOLVE_TIMEOUT`].
    pub fn solve(&self, problem: &RemoteProblem, cancel: &CancellationToken) -> Result<RemoteSolution, SolverError> {
        if cancel.is_cancelled() {
            return Err(SolverError::Cancelled);
        }
        let response = self
            .agent
            .post(&self.url)
            .set("Content-Type", "text/plain")
            .send_string(&problem.lp_text);

        let response = match response {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                tracing::warn!(url = %self.url, status, "remote solver returned a non-2xx response");
                return Err(SolverError::RemoteHttp { status, body });
            }
            Err(ureq::Error::Transport(transport)) => {
                tracing::warn!(url = %self.url, error = %transport, "remote solver unreachable");
                return Err(SolverError::RemoteUnreachable(transport.to_string()));
            }
        };

        let body = response
            .into_string()
            .map_err(|e| SolverError::RemoteParse(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| SolverError::RemoteParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_configured_url() {
        let client = RemoteSolverClient::new("https://solver.example.invalid/solve");
        assert_eq!(client.url, "https://solver.example.invalid/solve");
    }

    #[test]
    fn unreachable_url_yields_remote_unreachable() {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(200))
            .build();
        let client = RemoteSolverClient::with_agent("http://127.0.0.1:1/solve", agent);
        let problem = RemoteProblem::new("Maximize\n obj: x\nEnd\n");
        let err = client.solve(&problem, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, SolverError::RemoteUnreachable(_)));
    }

    #[test]
    fn cancelled_token_short_circuits_before_sending() {
        let client = RemoteSolverClient::new("https://solver.example.invalid/solve");
        let problem = RemoteProblem::new("Maximize\n obj: x\nEnd\n");
        let token = CancellationToken::new();
        token.cancel();
        let err = client.solve(&problem, &token).unwrap_err();
        assert!(matches!(err, SolverError::Cancelled));
    }
}
