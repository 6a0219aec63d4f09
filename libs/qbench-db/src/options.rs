//! Building handles from configuration: env expansion, redaction, connect.

use std::sync::LazyLock;

use regex::Regex;

use crate::{DbConnConfig, DbError, DbHandle, Result};

static ENV_PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").ok());

/// Build a database handle from configuration.
///
/// Expands `${VAR}` placeholders in the DSN, logs the (redacted) target and connects.
///
/// # Errors
/// Returns an error if a referenced environment variable is missing, the DSN
/// is invalid, or the connection fails.
pub async fn build_db_handle(cfg: &DbConnConfig) -> Result<DbHandle> {
    let dsn = expand_env_vars(&cfg.dsn)?;
    let engine = DbHandle::detect(&dsn)?;

    tracing::debug!(
        dsn = %redact_credentials_in_dsn(Some(&dsn)),
        %engine,
        "Building database connection"
    );

    DbHandle::connect(&dsn, &cfg.pool).await
}

/// Replace every `${VAR}` in `input` with the value of the environment variable.
///
/// # Errors
/// Returns `DbError::EnvVar` if a referenced variable is unset or not unicode.
pub fn expand_env_vars(input: &str) -> Result<String> {
    if !input.contains("${") {
        return Ok(input.to_owned());
    }
    let re = ENV_PLACEHOLDER
        .as_ref()
        .ok_or_else(|| DbError::InvalidParameter("env placeholder pattern".to_owned()))?;

    let mut result = input.to_owned();
    for caps in re.captures_iter(input) {
        let full_match = &caps[0];
        let var_name = &caps[1];
        let value = std::env::var(var_name).map_err(|source| DbError::EnvVar {
            name: var_name.to_owned(),
            source,
        })?;
        result = result.replace(full_match, &value);
    }

    Ok(result)
}

/// Mask the password of a URL-style DSN so it can be logged or printed.
#[must_use]
pub fn redact_credentials_in_dsn(dsn: Option<&str>) -> String {
    match dsn {
        Some(dsn) if dsn.contains('@') => {
            if let Ok(mut parsed) = url::Url::parse(dsn) {
                if parsed.password().is_some() && parsed.set_password(Some("***")).is_err() {
                    return "***".to_owned();
                }
                parsed.to_string()
            } else {
                "***".to_owned()
            }
        }
        Some(dsn) => dsn.to_owned(),
        None => "none".to_owned(),
    }
}
