//! Partitioning of the user-id space into insert batches.

use std::ops::RangeInclusive;

use super::error::SeedError;
use super::model::{QUESTION_FIELDS, QUESTION_VARIANTS, SETTINGS_FIELDS, USER_FIELDS};

/// Users generated by a full seed run.
pub const TOTAL_USERS: u32 = 1_000_000;

/// Users per batch. Keeps the question insert (3 rows per user) well under
/// the `SQLite` bind-parameter ceiling.
pub const USER_BATCH_SIZE: u32 = 150;

/// Largest run whose question ids still fit the `INTEGER` primary key.
pub const MAX_TOTAL_USERS: u32 = 715_827_882;

/// Rows per table to put into one INSERT statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkSizes {
    pub users: usize,
    pub settings: usize,
    pub questions: usize,
}

/// Validated seeding parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedPlan {
    total_users: i32,
    batch_size: i32,
    chunks: ChunkSizes,
}

/// Contiguous, inclusive slice of user ids written together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UserRange {
    /// 1-based position of the batch within the run.
    pub index: i32,
    pub start: i32,
    pub end: i32,
}

impl UserRange {
    #[must_use]
    pub fn ids(&self) -> RangeInclusive<i32> {
        self.start..=self.end
    }

    #[must_use]
    pub fn len(&self) -> usize {
        usize::try_from(self.end - self.start + 1).unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl SeedPlan {
    /// # Errors
    /// Returns `SeedError::InvalidConfig` if either value is zero or the run
    /// would overflow the question id space.
    pub fn new(total_users: u32, batch_size: u32) -> Result<Self, SeedError> {
        if total_users == 0 {
            return Err(SeedError::InvalidConfig(
                "total_users must be a positive integer".to_owned(),
            ));
        }
        if batch_size == 0 {
            return Err(SeedError::InvalidConfig(
                "batch_size must be a positive integer".to_owned(),
            ));
        }
        if total_users > MAX_TOTAL_USERS {
            return Err(SeedError::InvalidConfig(format!(
                "total_users must not exceed {MAX_TOTAL_USERS}, got {total_users}"
            )));
        }

        // A batch never holds more users than the run has.
        let effective_batch = batch_size.min(total_users);
        let to_i32 = |v: u32| {
            i32::try_from(v).map_err(|_| SeedError::InvalidConfig(format!("{v} is out of range")))
        };
        let to_usize = |v: u32| {
            usize::try_from(v).map_err(|_| SeedError::InvalidConfig(format!("{v} is out of range")))
        };

        let users_chunk = to_usize(effective_batch)?;
        Ok(Self {
            total_users: to_i32(total_users)?,
            batch_size: to_i32(effective_batch)?,
            chunks: ChunkSizes {
                users: users_chunk,
                settings: users_chunk,
                questions: users_chunk * QUESTION_VARIANTS.len(),
            },
        })
    }

    #[must_use]
    pub fn total_users(&self) -> i32 {
        self.total_users
    }

    #[must_use]
    pub fn batch_size(&self) -> i32 {
        self.batch_size
    }

    #[must_use]
    pub fn chunk_sizes(&self) -> ChunkSizes {
        self.chunks
    }

    #[must_use]
    #[allow(clippy::integer_division)]
    pub fn batch_count(&self) -> i32 {
        (self.total_users + self.batch_size - 1) / self.batch_size
    }

    /// Batches in write order.
    #[must_use]
    pub fn batches(&self) -> Batches {
        Batches {
            next_start: 1,
            next_index: 1,
            total: self.total_users,
            batch: self.batch_size,
        }
    }

    /// Reject plans whose widest INSERT would exceed `max_bind_params`.
    ///
    /// # Errors
    /// Returns `SeedError::Capacity` naming the offending table.
    pub fn check_capacity(&self, max_bind_params: usize) -> Result<(), SeedError> {
        let statements = [
            ("users", self.chunks.users, USER_FIELDS),
            ("user_settings", self.chunks.settings, SETTINGS_FIELDS),
            ("questions", self.chunks.questions, QUESTION_FIELDS),
        ];
        for (table, rows, fields) in statements {
            let params = rows.saturating_mul(fields);
            if params > max_bind_params {
                return Err(SeedError::Capacity {
                    op: format!("insert into {table}"),
                    detail: format!(
                        "{rows} rows need {params} bind parameters, backend allows {max_bind_params}; lower the batch size"
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Iterator over the [`UserRange`]s of a plan.
#[derive(Clone, Debug)]
pub struct Batches {
    next_start: i32,
    next_index: i32,
    total: i32,
    batch: i32,
}

impl Iterator for Batches {
    type Item = UserRange;

    fn next(&mut self) -> Option<UserRange> {
        if self.next_start > self.total {
            return None;
        }
        let start = self.next_start;
        let end = start.saturating_add(self.batch - 1).min(self.total);
        let range = UserRange {
            index: self.next_index,
            start,
            end,
        };
        self.next_start = end.saturating_add(1);
        self.next_index += 1;
        Some(range)
    }
}
