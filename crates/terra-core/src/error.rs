//! Unified error type for the assignment engine.
//!
//! [`CoreError`] is the common error representation used at crate
//! boundaries. Domain-specific error enums in other crates convert into it
//! for uniform handling by callers that don't care which layer failed.
//!
//! # Example
//!
//! ```
//! use terra_core::Configuration;
//!
//! # fn default_config() -> Configuration { unimplemented!() }
//! fn load(config: Configuration) -> terra_core::CoreResult<Configuration> {
//!     config.validate()?;
//!     Ok(config)
//! }
//! ```

use thiserror::Error;

/// Unified error type for core domain operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Missing configuration, no eligible reps, all accounts locked, etc.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced id (account, rep, opportunity) does not exist in the snapshot.
    #[error("unknown {kind} id: {id}")]
    UnknownId { kind: &'static str, id: String },

    /// Configuration is present but internally inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic wrapping for errors crossing from other crates.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias for results using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

impl From<String> for CoreError {
    fn from(s: String) -> Self {
        CoreError::Other(s)
    }
}

impl From<&str> for CoreError {
    fn from(s: &str) -> Self {
        CoreError::Other(s.to_string())
    }
}
