#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Database handle crate for the query benchmark.
//!
//! Wraps a `SQLx` pool for one of the two supported engines (`SQLite`,
//! `PostgreSQL`) together with the `SeaORM` connection built on top of it.
//! Handles are explicit values: callers build one per backend from a
//! [`DbConnConfig`] and pass it to whatever needs storage.
//!
//! # Features
//! - `pg`, `sqlite`: enable `SQLx` backends (both on by default)
//!
//! # Example
//! ```rust,no_run
//! use qbench_db::{DbConnConfig, PoolCfg, build_db_handle};
//!
//! # async fn example() -> qbench_db::Result<()> {
//! let cfg = DbConnConfig {
//!     dsn: "sqlite://data/qbench.sqlite3?journal_mode=WAL".to_owned(),
//!     pool: PoolCfg::default(),
//! };
//! let db = build_db_handle(&cfg).await?;
//! println!("connected to {} at {}", db.engine(), db.dsn());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(
    not(any(feature = "pg", feature = "sqlite")),
    allow(
        unused_imports,
        unused_variables,
        dead_code,
        unreachable_code,
        clippy::unused_async,
    )
)]

pub mod config;
pub mod options;

mod pool_opts;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use config::{DbConnConfig, PoolCfg};
pub use options::{build_db_handle, expand_env_vars, redact_credentials_in_dsn};

#[cfg(any(feature = "pg", feature = "sqlite"))]
use pool_opts::ApplyPoolOpts;

#[cfg(feature = "pg")]
use sea_orm::sqlx::{PgPool, postgres::PgPoolOptions};
#[cfg(feature = "sqlite")]
use sea_orm::sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

use sea_orm::DatabaseConnection;
#[cfg(feature = "pg")]
use sea_orm::SqlxPostgresConnector;
#[cfg(feature = "sqlite")]
use sea_orm::SqlxSqliteConnector;

use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for the DB handle and helpers.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error("Invalid SQLite PRAGMA parameter '{key}': {message}")]
    InvalidSqlitePragma { key: String, message: String },

    #[error("Invalid connection parameter: {0}")]
    InvalidParameter(String),

    #[error("Environment variable '{name}' is not usable: {source}")]
    EnvVar {
        name: String,
        #[source]
        source: std::env::VarError,
    },

    #[cfg(any(feature = "pg", feature = "sqlite"))]
    #[error(transparent)]
    Sqlx(#[from] sea_orm::sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

impl DbEngine {
    /// Largest number of bind parameters a single statement may carry.
    ///
    /// `PostgreSQL` encodes the count as a 16-bit integer; `SQLite` builds bundled
    /// by `SQLx` use the 3.32+ default of `SQLITE_MAX_VARIABLE_NUMBER`.
    #[must_use]
    pub const fn max_bind_params(self) -> usize {
        match self {
            DbEngine::Postgres => 65_535,
            DbEngine::Sqlite => 32_766,
        }
    }

    /// Human-readable label used in benchmark reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            DbEngine::Postgres => "Postgres",
            DbEngine::Sqlite => "SQLite",
        }
    }
}

impl std::fmt::Display for DbEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One concrete sqlx pool.
#[derive(Clone, Debug)]
enum DbPool {
    #[cfg(feature = "pg")]
    Postgres(PgPool),
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePool),
}

/// Main handle.
#[derive(Debug, Clone)]
pub struct DbHandle {
    engine: DbEngine,
    pool: DbPool,
    dsn: String,
    sea: DatabaseConnection,
}

#[cfg(feature = "sqlite")]
const DEFAULT_SQLITE_BUSY_TIMEOUT_MS: u64 = 5000;

impl DbHandle {
    /// Detect engine by DSN.
    ///
    /// Note: we only check scheme prefixes and don't mutate the tail (credentials etc.).
    ///
    /// # Errors
    /// Returns `DbError::UnknownDsn` if the DSN scheme is not recognized.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        // Trim only leading spaces/newlines to be forgiving with env files.
        let s = dsn.trim_start();

        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_credentials_in_dsn(Some(dsn))))
        }
    }

    /// Connect and build handle.
    ///
    /// # Errors
    /// Returns an error if the connection fails or the DSN is invalid.
    pub async fn connect(dsn: &str, pool: &PoolCfg) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        match engine {
            #[cfg(feature = "pg")]
            DbEngine::Postgres => {
                let opts: sea_orm::sqlx::postgres::PgConnectOptions = dsn
                    .parse()
                    .map_err(|e: sea_orm::sqlx::Error| DbError::InvalidParameter(e.to_string()))?;
                let sqlx_pool = PgPoolOptions::new().apply(pool).connect_with(opts).await?;
                let sea = SqlxPostgresConnector::from_sqlx_postgres_pool(sqlx_pool.clone());
                Ok(Self {
                    engine,
                    pool: DbPool::Postgres(sqlx_pool),
                    dsn: redact_credentials_in_dsn(Some(dsn)),
                    sea,
                })
            }
            #[cfg(not(feature = "pg"))]
            DbEngine::Postgres => Err(DbError::FeatureDisabled("PostgreSQL feature not enabled")),
            #[cfg(feature = "sqlite")]
            DbEngine::Sqlite => {
                let (clean_dsn, pairs) = sqlite::extract_sqlite_pragmas(dsn);
                let pragmas = sqlite::Pragmas::from_pairs(&pairs)?;
                let is_memory = sqlite::is_memory_dsn(&clean_dsn);

                let mut opts: sea_orm::sqlx::sqlite::SqliteConnectOptions = clean_dsn
                    .parse()
                    .map_err(|e: sea_orm::sqlx::Error| DbError::InvalidParameter(e.to_string()))?;
                opts = opts.create_if_missing(true).foreign_keys(true);
                opts = pragmas.apply(opts, is_memory, DEFAULT_SQLITE_BUSY_TIMEOUT_MS);

                if !is_memory {
                    sqlite::prepare_sqlite_dir(opts.get_filename())?;
                }

                let mut pool_opts = SqlitePoolOptions::new().apply(pool);
                if is_memory {
                    // The in-memory database lives only as long as one of its connections.
                    pool_opts = pool_opts
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None);
                }

                let sqlx_pool = pool_opts.connect_with(opts).await?;
                let sea = SqlxSqliteConnector::from_sqlx_sqlite_pool(sqlx_pool.clone());

                Ok(Self {
                    engine,
                    pool: DbPool::Sqlite(sqlx_pool),
                    dsn: clean_dsn,
                    sea,
                })
            }
            #[cfg(not(feature = "sqlite"))]
            DbEngine::Sqlite => Err(DbError::FeatureDisabled("SQLite feature not enabled")),
        }
    }

    /// Graceful pool close. (Dropping the pool also closes it; this just makes it explicit.)
    pub async fn close(self) {
        match self.pool {
            #[cfg(feature = "pg")]
            DbPool::Postgres(p) => p.close().await,
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(p) => p.close().await,
        }
    }

    /// Get the backend.
    #[must_use]
    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// Get the DSN used for this connection, with credentials redacted.
    #[must_use]
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// `SeaORM` connection sharing this handle's pool.
    #[must_use]
    pub fn sea(&self) -> &DatabaseConnection {
        &self.sea
    }

    // --- sqlx accessors ---
    #[cfg(feature = "pg")]
    #[must_use]
    pub fn sqlx_postgres(&self) -> Option<&PgPool> {
        match self.pool {
            DbPool::Postgres(ref p) => Some(p),
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(_) => None,
        }
    }

    #[cfg(feature = "sqlite")]
    #[must_use]
    pub fn sqlx_sqlite(&self) -> Option<&SqlitePool> {
        match self.pool {
            DbPool::Sqlite(ref p) => Some(p),
            #[cfg(feature = "pg")]
            DbPool::Postgres(_) => None,
        }
    }
}

// ===================== tests =====================
