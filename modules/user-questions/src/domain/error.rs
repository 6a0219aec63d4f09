use sea_orm::DbErr;

/// Seeding failures. All of them are fatal and abort the remaining batches.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("invalid seed configuration: {0}")]
    InvalidConfig(String),

    /// A statement would carry more rows or parameters than the backend accepts.
    #[error("backend capacity exceeded during {op}: {detail}")]
    Capacity { op: String, detail: String },

    /// Duplicate email/id or a dangling foreign key.
    #[error("constraint violation during {op}: {detail}")]
    ConstraintViolation { op: String, detail: String },

    /// Connectivity and every other backend error.
    #[error("database error during {op}: {source}")]
    Database {
        op: String,
        #[source]
        source: DbErr,
    },
}

impl SeedError {
    /// Whether the error comes from the backend rejecting the data itself.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, SeedError::ConstraintViolation { .. })
    }
}
