//! Subcommand handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;
use qbench_db::{DbConnConfig, DbHandle, build_db_handle, redact_credentials_in_dsn};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use user_questions::{
    BenchRunner, BenchTarget, Migrator, RngSource, SeaOrmSeedStore, SeedPlan, SeedService,
};

use crate::config::{AppConfig, DatabaseConfig};

/// Which configured database(s) a command acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Sqlite,
    Postgres,
    All,
}

impl Backend {
    fn configs(self, db: &DatabaseConfig) -> Vec<&DbConnConfig> {
        match self {
            Backend::Sqlite => vec![&db.sqlite],
            Backend::Postgres => vec![&db.postgres],
            Backend::All => vec![&db.sqlite, &db.postgres],
        }
    }
}

async fn connect(cfg: &DbConnConfig) -> Result<DbHandle> {
    build_db_handle(cfg)
        .await
        .with_context(|| format!("failed to connect to {}", redact_credentials_in_dsn(Some(&cfg.dsn))))
}

pub async fn migrate(config: &AppConfig, backend: Backend, down: bool) -> Result<()> {
    for cfg in backend.configs(&config.database) {
        let db = connect(cfg).await?;
        let engine = db.engine();
        let result = if down {
            Migrator::down(db.sea(), None).await
        } else {
            Migrator::up(db.sea(), None).await
        };
        result.with_context(|| format!("migration failed on {engine}"))?;

        info!(%engine, down, "Schema migrated");
        println!("{engine}: schema {}", if down { "dropped" } else { "up to date" });
        db.close().await;
    }
    Ok(())
}

pub async fn seed(config: &AppConfig, backend: Backend, seed: Option<u64>) -> Result<()> {
    let plan = SeedPlan::new(config.seed.total_users, config.seed.batch_size)?;

    for cfg in backend.configs(&config.database) {
        let db = connect(cfg).await?;
        let engine = db.engine();
        let service = SeedService::new(Arc::new(SeaOrmSeedStore::new(db.clone())));
        let mut rng = match seed {
            Some(s) => RngSource::seeded(s),
            None => RngSource::from_os_rng(),
        };

        info!(%engine, users = plan.total_users(), batches = plan.batch_count(), "Seeding");
        let summary = service
            .seed(&plan, &mut rng)
            .await
            .with_context(|| format!("seeding {engine} failed"))?;

        println!(
            "{engine}: seeded {} users, {} settings, {} questions in {} batches ({} ms)",
            summary.users,
            summary.settings,
            summary.questions,
            summary.batches,
            summary.elapsed.as_millis()
        );
        db.close().await;
    }
    Ok(())
}

pub async fn bench(config: &AppConfig, backend: Backend) -> Result<()> {
    let runner = BenchRunner::new(config.bench.clone())?;

    let mut targets = Vec::new();
    for cfg in backend.configs(&config.database) {
        let db = connect(cfg).await?;
        let engine = db.engine();
        let target = BenchTarget::resolve(db, &config.bench)
            .await
            .with_context(|| format!("cannot pick a benchmark user on {engine}"))?;
        info!(%engine, email = target.email(), "Benchmark target");
        targets.push(target);
    }

    let report = runner.run(&targets).await?;
    print!("{report}");

    for target in targets {
        target.db().clone().close().await;
    }
    Ok(())
}

pub fn check(config: &AppConfig) -> Result<()> {
    info!("Checking configuration...");
    SeedPlan::new(config.seed.total_users, config.seed.batch_size)?;
    BenchRunner::new(config.bench.clone())?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}
