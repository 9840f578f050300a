//! Crate-boundary error enum (§7). Pure transformations (scoring, the
//! problem builder, the rationale generator, the threshold calculator)
//! never throw on business data — they return a result plus warnings.
//! This enum covers only the fail-fast, invalid-input cases named in §7:
//! missing configuration, no eligible reps, all accounts locked.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("no assignment-eligible reps in scope")]
    NoEligibleReps,

    #[error("all accounts in scope are locked; nothing to assign")]
    AllAccountsLocked,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type ScoringResult<T> = Result<T, ScoringError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_actionable() {
        assert!(ScoringError::NoEligibleReps.to_string().contains("eligible reps"));
        assert!(ScoringError::AllAccountsLocked.to_string().contains("locked"));
    }
}
