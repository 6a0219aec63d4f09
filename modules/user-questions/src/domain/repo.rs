use std::fmt;

use async_trait::async_trait;

use super::error::SeedError;
use super::model::{NewQuestion, NewUser, NewUserSettings};
use super::plan::{ChunkSizes, UserRange};

/// Tables written by the seeder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeedTable {
    Users,
    UserSettings,
    Questions,
}

impl SeedTable {
    /// Child tables first so foreign keys never dangle mid-clear.
    pub const CLEAR_ORDER: [SeedTable; 3] =
        [SeedTable::UserSettings, SeedTable::Questions, SeedTable::Users];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SeedTable::Users => "users",
            SeedTable::UserSettings => "user_settings",
            SeedTable::Questions => "questions",
        }
    }
}

impl fmt::Display for SeedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rows for one contiguous range of users.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedBatch {
    pub range: UserRange,
    pub users: Vec<NewUser>,
    pub settings: Vec<NewUserSettings>,
    pub questions: Vec<NewQuestion>,
}

/// Storage seam for the seed generator.
#[async_trait]
pub trait SeedStore: Send + Sync {
    /// Bind-parameter ceiling of one statement on this backend.
    fn max_bind_params(&self) -> usize;

    /// Delete every row of `table`, returning the number removed.
    async fn clear_table(&self, table: SeedTable) -> Result<u64, SeedError>;

    /// Write users, then settings, then questions as one unit, with no INSERT
    /// carrying more rows than `chunks` allows for its table.
    async fn write_batch(&self, batch: &SeedBatch, chunks: ChunkSizes) -> Result<(), SeedError>;
}
