#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Seeding against a real `SQLite` database.

mod common;

use std::sync::Arc;

use common::{MALFORMED_USERS_SQL, migrated_sqlite, scalar};
use sea_orm::EntityTrait;
use user_questions::domain::plan::ChunkSizes;
use user_questions::domain::service::BatchBuilder;
use user_questions::infra::storage::entity::{QuestionEntity, UserEntity, UserSettingsEntity};
use user_questions::{RngSource, SeaOrmSeedStore, SeedError, SeedPlan, SeedService, SeedStore};

#[tokio::test]
async fn seeding_fills_all_three_tables() {
    let (_dir, db) = migrated_sqlite().await.unwrap();
    let service = SeedService::new(Arc::new(SeaOrmSeedStore::new(db.clone())));
    let plan = SeedPlan::new(40, 7).unwrap();

    let summary = service
        .seed(&plan, &mut RngSource::seeded(42))
        .await
        .unwrap();
    assert_eq!(summary.batches, 6);

    assert_eq!(scalar(&db, "SELECT COUNT(*) AS c FROM users").await.unwrap(), 40);
    assert_eq!(
        scalar(&db, "SELECT COUNT(*) AS c FROM user_settings").await.unwrap(),
        40
    );
    assert_eq!(
        scalar(&db, "SELECT COUNT(*) AS c FROM questions").await.unwrap(),
        120
    );
    assert_eq!(scalar(&db, MALFORMED_USERS_SQL).await.unwrap(), 0);
    assert_eq!(
        scalar(&db, "SELECT COUNT(DISTINCT email) AS c FROM users")
            .await
            .unwrap(),
        40
    );
    assert_eq!(
        scalar(&db, "SELECT MAX(id) AS c FROM questions").await.unwrap(),
        120
    );
}

#[tokio::test]
async fn rerunning_the_seed_starts_from_empty_tables() {
    let (_dir, db) = migrated_sqlite().await.unwrap();
    let service = SeedService::new(Arc::new(SeaOrmSeedStore::new(db.clone())));
    let plan = SeedPlan::new(12, 5).unwrap();

    service
        .seed(&plan, &mut RngSource::seeded(1))
        .await
        .unwrap();
    service
        .seed(&plan, &mut RngSource::seeded(2))
        .await
        .unwrap();

    assert_eq!(scalar(&db, "SELECT COUNT(*) AS c FROM users").await.unwrap(), 12);
    assert_eq!(
        scalar(&db, "SELECT COUNT(*) AS c FROM questions").await.unwrap(),
        36
    );
    assert_eq!(scalar(&db, MALFORMED_USERS_SQL).await.unwrap(), 0);
}

#[tokio::test]
async fn unset_visibility_is_stored_as_null() {
    let (_dir, db) = migrated_sqlite().await.unwrap();
    let service = SeedService::new(Arc::new(SeaOrmSeedStore::new(db.clone())));
    service
        .seed(&SeedPlan::new(3, 2).unwrap(), &mut RngSource::seeded(8))
        .await
        .unwrap();

    let unset = QuestionEntity::find_by_id(3)
        .one(db.sea())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unset.visibility, None);
    assert_eq!(unset.user_id, Some(1));
    assert_eq!(unset.question, "Question text for user 1 with visibility null");
    assert!(unset.created_at.is_some());

    let last = QuestionEntity::find_by_id(9)
        .one(db.sea())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(last.user_id, Some(3));
}

#[tokio::test]
async fn deleting_a_user_cascades_settings_and_orphans_questions() {
    let (_dir, db) = migrated_sqlite().await.unwrap();
    let service = SeedService::new(Arc::new(SeaOrmSeedStore::new(db.clone())));
    service
        .seed(&SeedPlan::new(2, 2).unwrap(), &mut RngSource::seeded(3))
        .await
        .unwrap();

    UserEntity::delete_by_id(1).exec(db.sea()).await.unwrap();

    assert!(
        UserSettingsEntity::find_by_id(1)
            .one(db.sea())
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(
        scalar(&db, "SELECT COUNT(*) AS c FROM questions WHERE user_id IS NULL")
            .await
            .unwrap(),
        3
    );
    assert_eq!(
        scalar(&db, "SELECT COUNT(*) AS c FROM questions").await.unwrap(),
        6
    );
}

#[tokio::test]
async fn writing_the_same_batch_twice_is_a_constraint_violation() {
    let (_dir, db) = migrated_sqlite().await.unwrap();
    let store = SeaOrmSeedStore::new(db.clone());
    let plan = SeedPlan::new(4, 4).unwrap();
    let batch = BatchBuilder::new().build(
        plan.batches().next().unwrap(),
        &mut RngSource::seeded(5),
    );

    store.write_batch(&batch, plan.chunk_sizes()).await.unwrap();
    let err = store
        .write_batch(&batch, plan.chunk_sizes())
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation(), "unexpected error: {err}");

    // The failed batch rolled back as a unit.
    assert_eq!(scalar(&db, "SELECT COUNT(*) AS c FROM users").await.unwrap(), 4);
}

#[tokio::test]
async fn oversized_batches_fail_before_touching_the_tables() {
    let (_dir, db) = migrated_sqlite().await.unwrap();
    let service = SeedService::new(Arc::new(SeaOrmSeedStore::new(db.clone())));
    service
        .seed(&SeedPlan::new(5, 5).unwrap(), &mut RngSource::seeded(6))
        .await
        .unwrap();

    // 15000 question rows * 7 columns is far past the SQLite ceiling
    let err = service
        .seed(&SeedPlan::new(10_000, 5_000).unwrap(), &mut RngSource::seeded(7))
        .await
        .unwrap_err();
    assert!(matches!(err, SeedError::Capacity { .. }), "unexpected error: {err}");
    assert_eq!(scalar(&db, "SELECT COUNT(*) AS c FROM users").await.unwrap(), 5);
}

#[tokio::test]
async fn settings_without_their_user_are_a_constraint_violation() {
    let (_dir, db) = migrated_sqlite().await.unwrap();
    let store = SeaOrmSeedStore::new(db.clone());
    let plan = SeedPlan::new(3, 3).unwrap();
    let mut batch = BatchBuilder::new().build(
        plan.batches().next().unwrap(),
        &mut RngSource::seeded(9),
    );
    batch.users.clear();

    let err = store
        .write_batch(&batch, plan.chunk_sizes())
        .await
        .unwrap_err();
    assert!(err.is_constraint_violation(), "unexpected error: {err}");
    assert!(err.to_string().contains("user_settings"), "unexpected error: {err}");
    assert_eq!(
        scalar(&db, "SELECT COUNT(*) AS c FROM user_settings").await.unwrap(),
        0
    );
}

#[tokio::test]
async fn statements_past_the_sqlite_variable_limit_are_a_capacity_error() {
    let (_dir, db) = migrated_sqlite().await.unwrap();
    let store = SeaOrmSeedStore::new(db.clone());
    let plan = SeedPlan::new(6_000, 6_000).unwrap();
    let batch = BatchBuilder::new().build(
        plan.batches().next().unwrap(),
        &mut RngSource::seeded(10),
    );

    // 18000 question rows * 7 columns in one statement
    let chunks = ChunkSizes {
        users: 6_000,
        settings: 6_000,
        questions: 18_000,
    };
    let err = store.write_batch(&batch, chunks).await.unwrap_err();
    assert!(matches!(err, SeedError::Capacity { .. }), "unexpected error: {err}");

    // Users and settings went in first and were rolled back with the batch.
    assert_eq!(scalar(&db, "SELECT COUNT(*) AS c FROM users").await.unwrap(), 0);
}
