use sea_orm::DbErr;

use crate::domain::model::UnknownVisibility;

/// Benchmark failures. Any of them stops the suite.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("invalid bench configuration: {0}")]
    InvalidConfig(String),

    #[error("no user with email '{email}'")]
    UserNotFound { email: String },

    #[error("no user with id {user_id} to take the target email from; seed the database first")]
    ProbeUserNotFound { user_id: i32 },

    #[error("user {user_id} has no settings row")]
    SettingsNotFound { user_id: i32 },

    #[error("question row is corrupt: {0}")]
    CorruptRow(#[from] UnknownVisibility),

    #[error(transparent)]
    Db(#[from] DbErr),
}
