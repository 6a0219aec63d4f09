//! Read-strategy benchmarks.
//!
//! Two ways of fetching the questions visible on a user's profile are timed
//! against each configured backend: three dependent lookups, or one join.

mod config;
mod error;
mod runner;
mod strategies;

pub use config::{BenchConfig, ConcurrentRun};
pub use error::BenchError;
pub use runner::{
    BenchReport, BenchRunner, BenchTarget, Scenario, ScenarioKind, ScenarioResult,
    resolve_target_email, run_concurrent, run_serial,
};
pub use strategies::QueryStrategy;
