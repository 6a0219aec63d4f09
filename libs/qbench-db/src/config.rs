//! Serializable connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbConnConfig {
    /// Connection string; `${VAR}` placeholders are expanded from the environment.
    pub dsn: String,
    #[serde(default)]
    pub pool: PoolCfg,
}

/// Pool knobs passed through to `SQLx`. Each driver applies the subset it supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolCfg {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    /// Minimum number of connections in the pool.
    pub min_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Option<Duration>,
    /// Idle timeout before a connection is closed.
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Option<Duration>,
    /// Maximum lifetime for a connection.
    #[serde(with = "humantime_serde")]
    pub max_lifetime: Option<Duration>,
    /// Test connection health before acquire.
    pub test_before_acquire: bool,
}

impl Default for PoolCfg {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            max_lifetime: None,
            test_before_acquire: false,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn pool_cfg_parses_humantime_durations() {
        let cfg: DbConnConfig = serde_json::from_value(serde_json::json!({
            "dsn": "sqlite::memory:",
            "pool": {
                "max_conns": 4,
                "acquire_timeout": "2s",
                "idle_timeout": "5m"
            }
        }))
        .unwrap();

        assert_eq!(cfg.pool.max_conns, Some(4));
        assert_eq!(cfg.pool.acquire_timeout, Some(Duration::from_secs(2)));
        assert_eq!(cfg.pool.idle_timeout, Some(Duration::from_secs(300)));
        assert_eq!(cfg.pool.max_lifetime, None);
    }

    #[test]
    fn pool_cfg_defaults_when_absent() {
        let cfg: DbConnConfig =
            serde_json::from_value(serde_json::json!({ "dsn": "sqlite::memory:" })).unwrap();
        assert_eq!(cfg.pool, PoolCfg::default());
    }

    #[test]
    fn unknown_pool_key_is_rejected() {
        let res: Result<DbConnConfig, _> = serde_json::from_value(serde_json::json!({
            "dsn": "sqlite::memory:",
            "pool": { "max_connections": 4 }
        }));
        assert!(res.is_err());
    }
}
