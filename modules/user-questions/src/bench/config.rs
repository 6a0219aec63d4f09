use serde::{Deserialize, Serialize};

use super::error::BenchError;

/// `concurrency` serial runs of `iterations` each, started together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConcurrentRun {
    pub concurrency: u32,
    pub iterations: u32,
}

/// Benchmark suite settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Email of the user whose questions are fetched. When unset, the email
    /// of `probe_user_id` is looked up on each backend.
    pub target_email: Option<String>,
    pub probe_user_id: i32,
    /// Iteration counts for the serial scenarios.
    pub serial_iterations: Vec<u32>,
    pub concurrent: Vec<ConcurrentRun>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            target_email: None,
            probe_user_id: 1,
            serial_iterations: vec![1, 10],
            concurrent: vec![
                ConcurrentRun {
                    concurrency: 5,
                    iterations: 1,
                },
                ConcurrentRun {
                    concurrency: 10,
                    iterations: 5,
                },
            ],
        }
    }
}

impl BenchConfig {
    /// # Errors
    /// Returns `BenchError::InvalidConfig` for zero counts or an empty email.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.serial_iterations.contains(&0) {
            return Err(BenchError::InvalidConfig(
                "serial_iterations entries must be positive".to_owned(),
            ));
        }
        if let Some(run) = self
            .concurrent
            .iter()
            .find(|r| r.concurrency == 0 || r.iterations == 0)
        {
            return Err(BenchError::InvalidConfig(format!(
                "concurrent run {}x{} must have positive counts",
                run.concurrency, run.iterations
            )));
        }
        if self.target_email.as_deref().is_some_and(str::is_empty) {
            return Err(BenchError::InvalidConfig(
                "target_email must not be empty".to_owned(),
            ));
        }
        Ok(())
    }
}
