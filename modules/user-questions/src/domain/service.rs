use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use super::error::SeedError;
use super::model::{NewQuestion, NewUser, NewUserSettings, QUESTION_VARIANTS, Visibility};
use super::plan::{SeedPlan, UserRange};
use super::random::RandomSource;
use super::repo::{SeedBatch, SeedStore, SeedTable};

/// Turns user ranges into rows, carrying the question id counter across batches.
#[derive(Debug)]
pub struct BatchBuilder {
    next_question_id: i32,
}

impl Default for BatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_question_id: 1,
        }
    }

    /// Rows for every id in `range`.
    ///
    /// Per user the random source is consulted in a fixed order: email, default
    /// visibility, then one coin flip per question variant.
    pub fn build(&mut self, range: UserRange, rng: &mut dyn RandomSource) -> SeedBatch {
        let n = range.len();
        let mut users = Vec::with_capacity(n);
        let mut settings = Vec::with_capacity(n);
        let mut questions = Vec::with_capacity(n * QUESTION_VARIANTS.len());

        for id in range.ids() {
            users.push(NewUser {
                id,
                name: format!("User_{id}"),
                email: format!("{}@example.com", rng.uuid()),
            });

            settings.push(NewUserSettings {
                user_id: id,
                default_visibility: rng.pick_visibility(),
                profile_handle: format!("handle_{id}"),
            });

            for visibility in QUESTION_VARIANTS {
                let question_id = self.next_question_id;
                self.next_question_id += 1;

                let label = visibility.map_or("null", Visibility::as_str);
                questions.push(NewQuestion {
                    id: question_id,
                    question: format!("Question text for user {id} with visibility {label}"),
                    answer: rng
                        .coin_flip()
                        .then(|| format!("Answer text for question {question_id}")),
                    visibility,
                    user_id: id,
                });
            }
        }

        SeedBatch {
            range,
            users,
            settings,
            questions,
        }
    }
}

/// Rows written by a completed run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub batches: u64,
    pub users: u64,
    pub settings: u64,
    pub questions: u64,
    pub elapsed: Duration,
}

impl SeedSummary {
    fn record(&mut self, batch: &SeedBatch) {
        self.batches += 1;
        self.users += batch.users.len() as u64;
        self.settings += batch.settings.len() as u64;
        self.questions += batch.questions.len() as u64;
    }
}

/// Populates users, settings and questions through a [`SeedStore`].
pub struct SeedService<S: SeedStore> {
    store: Arc<S>,
}

impl<S: SeedStore> SeedService<S> {
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Delete all seeded rows, child tables first.
    ///
    /// # Errors
    /// Returns the first store error; later tables are left untouched.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<u64, SeedError> {
        let mut removed = 0;
        for table in SeedTable::CLEAR_ORDER {
            let n = self.store.clear_table(table).await?;
            debug!(%table, rows = n, "Cleared table");
            removed += n;
        }
        Ok(removed)
    }

    /// Clear the tables, then write every batch of `plan` in order.
    ///
    /// Batches already written stay in place when a later one fails; running
    /// the seed again starts over from empty tables.
    ///
    /// # Errors
    /// Returns `SeedError::Capacity` before touching storage if the plan's
    /// statements exceed the backend limit, otherwise the first store error.
    #[instrument(
        skip(self, plan, rng),
        fields(total_users = plan.total_users(), batch_size = plan.batch_size())
    )]
    pub async fn seed(
        &self,
        plan: &SeedPlan,
        rng: &mut dyn RandomSource,
    ) -> Result<SeedSummary, SeedError> {
        plan.check_capacity(self.store.max_bind_params())?;

        let started = Instant::now();
        self.clear().await?;

        let total_batches = plan.batch_count();
        let chunks = plan.chunk_sizes();
        let mut builder = BatchBuilder::new();
        let mut summary = SeedSummary::default();

        for range in plan.batches() {
            let batch = builder.build(range, rng);
            info!("Inserting batch {} of {}", range.index, total_batches);
            self.store.write_batch(&batch, chunks).await?;
            summary.record(&batch);
        }

        summary.elapsed = started.elapsed();
        info!(
            users = summary.users,
            questions = summary.questions,
            elapsed_ms = summary.elapsed.as_millis(),
            "Seeding completed."
        );
        Ok(summary)
    }
}
