use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Filter directive for the `-v` count; zero defers to the configured level.
fn directive(cfg: &LoggingConfig, verbose: u8) -> &str {
    match verbose {
        0 => &cfg.level,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Logs go to stderr so that reports on stdout
/// stay machine-readable. `RUST_LOG` wins over both config and `-v`.
///
/// # Errors
/// Returns an error if the directive is invalid or a subscriber is already set.
pub fn init_logging(cfg: &LoggingConfig, verbose: u8) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directive(cfg, verbose))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match cfg.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_the_level() {
        let cfg = LoggingConfig {
            level: "warn".to_owned(),
            format: LogFormat::Pretty,
        };
        assert_eq!(directive(&cfg, 0), "warn");
        assert_eq!(directive(&cfg, 1), "info");
        assert_eq!(directive(&cfg, 2), "debug");
        assert_eq!(directive(&cfg, 7), "trace");
    }
}
