//! SQLite-specific helpers: DSN cleaning, the PRAGMA whitelist and path preparation.

use std::path::Path;
use std::time::Duration;

use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteSynchronous};

use crate::{DbError, Result};

/// Whitelisted `SQLite` PRAGMA parameters accepted in the DSN query string.
const ALLOWED_PRAGMAS: &[&str] = &["wal", "synchronous", "busy_timeout", "journal_mode"];

/// Split PRAGMA parameters off a `SQLite` DSN.
///
/// Returns the DSN with whitelisted keys removed (other query keys such as
/// `mode` or `cache` are kept for `SQLx`) and the removed key/value pairs.
pub fn extract_sqlite_pragmas(dsn: &str) -> (String, Vec<(String, String)>) {
    let Some((base, query)) = dsn.split_once('?') else {
        return (dsn.to_owned(), Vec::new());
    };

    let mut kept = Vec::new();
    let mut pragmas = Vec::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if ALLOWED_PRAGMAS.contains(&key.to_lowercase().as_str()) {
            pragmas.push((key.to_lowercase(), value.to_owned()));
        } else {
            kept.push(pair);
        }
    }

    let clean = if kept.is_empty() {
        base.to_owned()
    } else {
        format!("{base}?{}", kept.join("&"))
    };
    (clean, pragmas)
}

/// In-memory databases need a pinned connection and no busy timeout.
pub fn is_memory_dsn(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// Create the parent directory of a file database if it is missing.
pub fn prepare_sqlite_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Validated PRAGMA settings parsed from a DSN.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pragmas {
    pub journal_mode: Option<JournalMode>,
    pub wal_toggle: Option<bool>,
    pub synchronous: Option<SyncMode>,
    pub busy_timeout_ms: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JournalMode {
    Delete,
    Wal,
    Memory,
    Truncate,
    Persist,
    Off,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    Off,
    Normal,
    Full,
    Extra,
}

impl JournalMode {
    fn sqlx(self) -> SqliteJournalMode {
        match self {
            JournalMode::Delete => SqliteJournalMode::Delete,
            JournalMode::Wal => SqliteJournalMode::Wal,
            JournalMode::Memory => SqliteJournalMode::Memory,
            JournalMode::Truncate => SqliteJournalMode::Truncate,
            JournalMode::Persist => SqliteJournalMode::Persist,
            JournalMode::Off => SqliteJournalMode::Off,
        }
    }
}

impl SyncMode {
    fn sqlx(self) -> SqliteSynchronous {
        match self {
            SyncMode::Off => SqliteSynchronous::Off,
            SyncMode::Normal => SqliteSynchronous::Normal,
            SyncMode::Full => SqliteSynchronous::Full,
            SyncMode::Extra => SqliteSynchronous::Extra,
        }
    }
}

impl Pragmas {
    /// Validate key/value pairs produced by [`extract_sqlite_pragmas`].
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self> {
        let mut out = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "wal" => out.wal_toggle = Some(validate_wal_pragma(value)?),
                "journal_mode" => out.journal_mode = Some(validate_journal_mode_pragma(value)?),
                "synchronous" => out.synchronous = Some(validate_synchronous_pragma(value)?),
                "busy_timeout" => out.busy_timeout_ms = Some(validate_busy_timeout_pragma(value)?),
                other => {
                    return Err(DbError::InvalidSqlitePragma {
                        key: other.to_owned(),
                        message: "not a supported PRAGMA".to_owned(),
                    });
                }
            }
        }
        Ok(out)
    }

    /// Apply the settings, falling back to WAL/NORMAL for files and DELETE for memory.
    pub fn apply(
        &self,
        mut opts: SqliteConnectOptions,
        is_memory: bool,
        default_busy_timeout_ms: u64,
    ) -> SqliteConnectOptions {
        let journal_mode = match (self.journal_mode, self.wal_toggle) {
            (Some(mode), _) => mode,
            (None, Some(true)) => JournalMode::Wal,
            (None, Some(false)) => JournalMode::Delete,
            (None, None) if is_memory => JournalMode::Delete,
            (None, None) => JournalMode::Wal,
        };
        opts = opts
            .journal_mode(journal_mode.sqlx())
            .synchronous(self.synchronous.unwrap_or(SyncMode::Normal).sqlx());

        if !is_memory {
            let timeout = self.busy_timeout_ms.unwrap_or(default_busy_timeout_ms);
            opts = opts.busy_timeout(Duration::from_millis(timeout));
        }
        opts
    }
}

/// Validate WAL PRAGMA value.
fn validate_wal_pragma(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(DbError::InvalidSqlitePragma {
            key: "wal".to_owned(),
            message: format!("must be true/false/1/0, got '{value}'"),
        }),
    }
}

/// Validate synchronous PRAGMA value.
fn validate_synchronous_pragma(value: &str) -> Result<SyncMode> {
    match value.to_uppercase().as_str() {
        "OFF" => Ok(SyncMode::Off),
        "NORMAL" => Ok(SyncMode::Normal),
        "FULL" => Ok(SyncMode::Full),
        "EXTRA" => Ok(SyncMode::Extra),
        _ => Err(DbError::InvalidSqlitePragma {
            key: "synchronous".to_owned(),
            message: format!("must be OFF/NORMAL/FULL/EXTRA, got '{value}'"),
        }),
    }
}

/// Validate `busy_timeout` PRAGMA value.
fn validate_busy_timeout_pragma(value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| DbError::InvalidSqlitePragma {
            key: "busy_timeout".to_owned(),
            message: format!("must be a non-negative integer, got '{value}'"),
        })
}

/// Validate `journal_mode` PRAGMA value.
fn validate_journal_mode_pragma(value: &str) -> Result<JournalMode> {
    match value.to_uppercase().as_str() {
        "DELETE" => Ok(JournalMode::Delete),
        "WAL" => Ok(JournalMode::Wal),
        "MEMORY" => Ok(JournalMode::Memory),
        "TRUNCATE" => Ok(JournalMode::Truncate),
        "PERSIST" => Ok(JournalMode::Persist),
        "OFF" => Ok(JournalMode::Off),
        _ => Err(DbError::InvalidSqlitePragma {
            key: "journal_mode".to_owned(),
            message: format!("must be DELETE/WAL/MEMORY/TRUNCATE/PERSIST/OFF, got '{value}'"),
        }),
    }
}
