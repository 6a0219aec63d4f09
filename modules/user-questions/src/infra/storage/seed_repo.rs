//! `SeaORM` implementation of `SeedStore`.

use async_trait::async_trait;
use qbench_db::DbHandle;
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, DbErr, EntityTrait, IntoActiveModel, SqlErr,
    TransactionTrait,
};
use tracing::debug;

use super::entity::{QuestionEntity, UserEntity, UserSettingsEntity};
use super::mapper::{
    new_question_to_active_model, new_settings_to_active_model, new_user_to_active_model,
};
use crate::domain::error::SeedError;
use crate::domain::plan::ChunkSizes;
use crate::domain::repo::{SeedBatch, SeedStore, SeedTable};

/// Lowercased fragments of the errors backends raise for oversized statements.
const CAPACITY_MARKERS: [&str; 3] = ["too many sql variables", "too many arguments", "bind message"];

/// Seed storage over a [`DbHandle`].
pub struct SeaOrmSeedStore {
    db: DbHandle,
}

impl SeaOrmSeedStore {
    #[must_use]
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }
}

/// Map a backend error onto the seeding taxonomy.
pub fn classify_db_err(op: impl Into<String>, err: DbErr) -> SeedError {
    let op = op.into();
    if let Some(
        SqlErr::UniqueConstraintViolation(detail) | SqlErr::ForeignKeyConstraintViolation(detail),
    ) = err.sql_err()
    {
        return SeedError::ConstraintViolation { op, detail };
    }

    let message = err.to_string().to_lowercase();
    if CAPACITY_MARKERS.iter().any(|m| message.contains(m)) {
        return SeedError::Capacity {
            op,
            detail: err.to_string(),
        };
    }
    SeedError::Database { op, source: err }
}

/// Insert `rows` into `table` with at most `chunk` rows per statement.
async fn insert_chunked<A>(
    txn: &DatabaseTransaction,
    table: SeedTable,
    rows: Vec<A>,
    chunk: usize,
) -> Result<(), SeedError>
where
    A: ActiveModelTrait + Send + 'static,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
{
    let mut rows = rows.into_iter();
    loop {
        let part: Vec<A> = rows.by_ref().take(chunk.max(1)).collect();
        if part.is_empty() {
            return Ok(());
        }
        let n = part.len();
        <A::Entity as EntityTrait>::insert_many(part)
            .exec_without_returning(txn)
            .await
            .map_err(|e| classify_db_err(format!("insert into {table}"), e))?;
        debug!(%table, rows = n, "Inserted chunk");
    }
}

#[async_trait]
impl SeedStore for SeaOrmSeedStore {
    fn max_bind_params(&self) -> usize {
        self.db.engine().max_bind_params()
    }

    async fn clear_table(&self, table: SeedTable) -> Result<u64, SeedError> {
        let conn = self.db.sea();
        let result = match table {
            SeedTable::Users => UserEntity::delete_many().exec(conn).await,
            SeedTable::UserSettings => UserSettingsEntity::delete_many().exec(conn).await,
            SeedTable::Questions => QuestionEntity::delete_many().exec(conn).await,
        };
        result
            .map(|r| r.rows_affected)
            .map_err(|e| classify_db_err(format!("delete from {table}"), e))
    }

    async fn write_batch(&self, batch: &SeedBatch, chunks: ChunkSizes) -> Result<(), SeedError> {
        let now = chrono::Utc::now();
        let txn = self
            .db
            .sea()
            .begin()
            .await
            .map_err(|e| classify_db_err("begin batch", e))?;

        insert_chunked(
            &txn,
            SeedTable::Users,
            batch.users.iter().map(new_user_to_active_model).collect(),
            chunks.users,
        )
        .await?;
        insert_chunked(
            &txn,
            SeedTable::UserSettings,
            batch
                .settings
                .iter()
                .map(new_settings_to_active_model)
                .collect(),
            chunks.settings,
        )
        .await?;
        insert_chunked(
            &txn,
            SeedTable::Questions,
            batch
                .questions
                .iter()
                .map(|q| new_question_to_active_model(q, now))
                .collect(),
            chunks.questions,
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| classify_db_err(format!("commit batch {}", batch.range.index), e))
    }
}
