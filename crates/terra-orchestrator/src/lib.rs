//! # terra-orchestrator: Assignment Orchestrator
//!
//! Implements §4.8's `generate`/`execute` pipeline: loads inputs through a
//! [`PersistenceStore`], runs the customer and prospect passes (thresholds →
//! locks → MIP → waterfall fallback), and writes the resulting proposals
//! back through the same interface. Single-threaded cooperative (§5) — no
//! concurrency primitives of its own.

pub mod backfill;
pub mod error;
pub mod persistence;
pub mod progress;
pub mod report;
pub mod runner;

pub use backfill::{disable_backfill, enable_backfill};
pub use error::{OrchestratorError, OrchestratorResult};
pub use persistence::{
    AssignmentUpsert, AuditRecord, JsonFixtureStore, PersistenceStore, ProposedOppOwnerUpdate,
    ProposedOwnerUpdate, RepFilters,
};
pub use progress::{NullSink, ProgressEvent, ProgressSink, Stage};
pub use report::{ConflictEntry, ExecuteReport, GenerateReport, GenerateStatistics};
pub use runner::{execute, generate, Scope};
pub use terra_algo::CancellationToken;
