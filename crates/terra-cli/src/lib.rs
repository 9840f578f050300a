//! # terra-cli: account assignment command-line interface
//!
//! A thin shell over [`terra_orchestrator`]'s `generate`/`execute` pipeline
//! and [`terra_algo`]'s aggregation step, backed by a JSON fixture store.
//! No production persistence adapter is in scope (§1); this crate is the
//! local-fixture harness a caller runs against before wiring the
//! orchestrator into a real system.

pub mod cli;
pub mod commands;
pub mod config;
pub mod progress;
