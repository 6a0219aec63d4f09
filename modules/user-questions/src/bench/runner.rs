use std::fmt;
use std::time::{Duration, Instant};

use futures::future::try_join_all;
use qbench_db::{DbEngine, DbHandle};
use sea_orm::{ConnectionTrait, EntityTrait};
use tracing::{info, instrument};

use super::config::{BenchConfig, ConcurrentRun};
use super::error::BenchError;
use super::strategies::QueryStrategy;
use crate::infra::storage::entity::users;

/// Run `strategy` `iterations` times back to back.
///
/// # Errors
/// Returns the first strategy error.
pub async fn run_serial<C>(
    strategy: QueryStrategy,
    db: &C,
    email: &str,
    iterations: u32,
) -> Result<Duration, BenchError>
where
    C: ConnectionTrait,
{
    let started = Instant::now();
    for _ in 0..iterations {
        strategy.execute(db, email).await?;
    }
    Ok(started.elapsed())
}

/// Start `concurrency` serial runs at once and wait for all of them.
///
/// # Errors
/// Returns the first strategy error from any run.
pub async fn run_concurrent<C>(
    strategy: QueryStrategy,
    db: &C,
    email: &str,
    concurrency: u32,
    iterations: u32,
) -> Result<Duration, BenchError>
where
    C: ConnectionTrait,
{
    let started = Instant::now();
    try_join_all((0..concurrency).map(|_| run_serial(strategy, db, email, iterations))).await?;
    Ok(started.elapsed())
}

/// Email of the user with id `probe_user_id`.
///
/// # Errors
/// Returns `BenchError::ProbeUserNotFound` when no such user exists.
pub async fn resolve_target_email<C>(db: &C, probe_user_id: i32) -> Result<String, BenchError>
where
    C: ConnectionTrait,
{
    users::Entity::find_by_id(probe_user_id)
        .one(db)
        .await?
        .map(|u| u.email)
        .ok_or(BenchError::ProbeUserNotFound {
            user_id: probe_user_id,
        })
}

/// A backend and the user whose questions are fetched from it.
#[derive(Debug, Clone)]
pub struct BenchTarget {
    db: DbHandle,
    email: String,
}

impl BenchTarget {
    #[must_use]
    pub fn new(db: DbHandle, email: String) -> Self {
        Self { db, email }
    }

    /// Use the configured email, or look up the probe user's.
    ///
    /// # Errors
    /// Returns `BenchError::ProbeUserNotFound` or a database error.
    pub async fn resolve(db: DbHandle, config: &BenchConfig) -> Result<Self, BenchError> {
        let email = match &config.target_email {
            Some(email) => email.clone(),
            None => resolve_target_email(db.sea(), config.probe_user_id).await?,
        };
        Ok(Self { db, email })
    }

    #[must_use]
    pub fn engine(&self) -> DbEngine {
        self.db.engine()
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn db(&self) -> &DbHandle {
        &self.db
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenarioKind {
    Serial { iterations: u32 },
    Concurrent(ConcurrentRun),
}

/// One timed measurement of the suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scenario {
    pub strategy: QueryStrategy,
    /// Index into the targets the suite runs against.
    pub target: usize,
    pub engine: DbEngine,
    pub kind: ScenarioKind,
}

impl Scenario {
    #[must_use]
    pub fn label(&self) -> String {
        let Self {
            strategy, engine, ..
        } = self;
        match self.kind {
            ScenarioKind::Serial { iterations } => {
                format!("{iterations}x {strategy} with {engine}")
            }
            ScenarioKind::Concurrent(ConcurrentRun {
                concurrency,
                iterations,
            }) => {
                let unit = if iterations == 1 {
                    "iteration"
                } else {
                    "iterations"
                };
                format!(
                    "{concurrency} concurrent {strategy} with {engine} ({iterations} {unit} each)"
                )
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    pub label: String,
    pub elapsed: Duration,
}

/// Timings of a completed suite, printed one line per scenario.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BenchReport {
    pub results: Vec<ScenarioResult>,
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in &self.results {
            writeln!(f, "{}: {} milliseconds", r.label, r.elapsed.as_millis())?;
        }
        Ok(())
    }
}

/// Runs the benchmark suite described by a [`BenchConfig`].
#[derive(Debug, Clone)]
pub struct BenchRunner {
    config: BenchConfig,
}

impl BenchRunner {
    /// # Errors
    /// Returns `BenchError::InvalidConfig` if the config does not validate.
    pub fn new(config: BenchConfig) -> Result<Self, BenchError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Scenarios in execution order: every serial count per strategy and
    /// backend, then every concurrent shape per strategy and backend.
    #[must_use]
    pub fn plan(&self, engines: &[DbEngine]) -> Vec<Scenario> {
        let mut scenarios = Vec::new();
        for strategy in QueryStrategy::ALL {
            for (target, &engine) in engines.iter().enumerate() {
                for &iterations in &self.config.serial_iterations {
                    scenarios.push(Scenario {
                        strategy,
                        target,
                        engine,
                        kind: ScenarioKind::Serial { iterations },
                    });
                }
            }
        }
        for &run in &self.config.concurrent {
            for strategy in QueryStrategy::ALL {
                for (target, &engine) in engines.iter().enumerate() {
                    scenarios.push(Scenario {
                        strategy,
                        target,
                        engine,
                        kind: ScenarioKind::Concurrent(run),
                    });
                }
            }
        }
        scenarios
    }

    /// Run every planned scenario against `targets`, stopping at the first error.
    ///
    /// # Errors
    /// Returns the first [`BenchError`] raised by a strategy.
    #[instrument(skip_all, fields(targets = targets.len()))]
    pub async fn run(&self, targets: &[BenchTarget]) -> Result<BenchReport, BenchError> {
        let engines: Vec<DbEngine> = targets.iter().map(BenchTarget::engine).collect();
        let mut report = BenchReport::default();

        for scenario in self.plan(&engines) {
            let Some(target) = targets.get(scenario.target) else {
                continue;
            };
            let label = scenario.label();
            info!(scenario = %label, "Running benchmark");

            let conn = target.db().sea();
            let elapsed = match scenario.kind {
                ScenarioKind::Serial { iterations } => {
                    run_serial(scenario.strategy, conn, target.email(), iterations).await?
                }
                ScenarioKind::Concurrent(run) => {
                    run_concurrent(
                        scenario.strategy,
                        conn,
                        target.email(),
                        run.concurrency,
                        run.iterations,
                    )
                    .await?
                }
            };

            info!(scenario = %label, elapsed_ms = elapsed.as_millis(), "Benchmark finished");
            report.results.push(ScenarioResult {
                scenario,
                label,
                elapsed,
            });
        }
        Ok(report)
    }
}
