//! Integration tests for on-disk database initialization

use w2p_common::config::RootFolderInitializer;
use w2p_common::db::init_database;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let initializer = RootFolderInitializer::new(temp_dir.path().join("nested").join("root"));
    initializer.ensure_directory_exists().unwrap();

    let db_path = initializer.database_path();
    assert!(!db_path.exists());

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing_and_keeps_rows() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("wish2plan.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query(
        "INSERT INTO plans (id, title, scheduled_for, notes, created_at, updated_at)
         VALUES ('p1', 'Friday', '2026-10-23T19:00:00Z', NULL, '2026-10-19T00:00:00Z', '2026-10-19T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool.close().await;

    let reopened = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plans")
        .fetch_one(&reopened)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let temp_dir = tempfile::tempdir().unwrap();
    let pool = init_database(&temp_dir.path().join("fk.db")).await.unwrap();

    let result = sqlx::query(
        "INSERT INTO plan_items (id, plan_id, idea_id, sort_order) VALUES ('i1', 'missing', 'missing', 0)",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "Orphan plan item should be rejected");
}
