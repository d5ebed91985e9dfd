//! PostgreSQL-backed checkpoint CRUD and scoping.
//!
//! These tests require a running PostgreSQL with the migrations applied and
//! `DATABASE_URL` set, so they are ignored by default:
//!
//! ```text
//! cargo test --test checkpoint_pg_test -- --ignored
//! ```

use checkpoint_core::database::{DatabaseConnection, DatabaseMigrations};
use checkpoint_core::scopes::ScopeBuilder;
use checkpoint_core::{
    AccessIdentity, Checkpoint, CheckpointPatch, CheckpointService, CheckpointServiceError,
    NewCheckpoint,
};

async fn connect() -> DatabaseConnection {
    let db = DatabaseConnection::new()
        .await
        .expect("Failed to connect to database");
    DatabaseMigrations::run_all(db.pool())
        .await
        .expect("Failed to run migrations");
    db
}

fn unique_subject(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

#[tokio::test]
#[ignore] // Requires PostgreSQL (DATABASE_URL)
async fn pg_checkpoint_crud_with_ownership_filter() {
    let db = connect().await;
    let service = CheckpointService::with_pool(db.pool().clone());

    let subject_a = unique_subject("p");
    let subject_b = unique_subject("p");
    let alice = AccessIdentity::player(subject_a.clone());
    let bob = AccessIdentity::player(subject_b.clone());
    let admin = AccessIdentity::admin("ops-1");

    // Create binds the player's subject and sets both timestamps
    let created = service
        .create(
            &alice,
            NewCheckpoint {
                owner_name: "alice".to_string(),
                payload: "lvl3".to_string(),
                owner_id: Some("ignored".to_string()),
            },
        )
        .await
        .expect("create failed");
    assert_eq!(created.owner_id.as_deref(), Some(subject_a.as_str()));
    assert_eq!(created.created_at, created.last_edited_at);

    // The foreign player misses on every path
    assert!(matches!(
        service.get(&bob, created.id).await,
        Err(CheckpointServiceError::NotFound)
    ));
    assert!(matches!(
        service.delete(&bob, created.id).await,
        Err(CheckpointServiceError::NotFound)
    ));

    // The owner and the admin both see the row
    let fetched = service.get(&alice, created.id).await.expect("get failed");
    assert_eq!(fetched.payload, "lvl3");
    let admin_fetched = service.get(&admin, created.id).await.expect("admin get failed");
    assert_eq!(admin_fetched.owner_id.as_deref(), Some(subject_a.as_str()));

    // Update refreshes last_edited_at in the statement itself
    let updated = service
        .update(
            &alice,
            created.id,
            CheckpointPatch {
                payload: Some("lvl4".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update failed");
    assert_eq!(updated.payload, "lvl4");
    assert_eq!(updated.owner_name, "alice");
    assert!(updated.last_edited_at >= updated.created_at);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.owner_id.as_deref(), Some(subject_a.as_str()));

    // Scoped list only contains the owner's rows
    let listed = service.list(&alice).await.expect("list failed");
    assert!(listed.iter().any(|c| c.id == created.id));
    assert!(listed.iter().all(|c| c.owner_id.as_deref() == Some(subject_a.as_str())));

    // Delete is permanent and repeat deletes are NotFound
    service.delete(&alice, created.id).await.expect("delete failed");
    assert!(matches!(
        service.delete(&alice, created.id).await,
        Err(CheckpointServiceError::NotFound)
    ));

    db.close().await;
}

#[tokio::test]
#[ignore] // Requires PostgreSQL (DATABASE_URL)
async fn pg_scope_count_and_exists_keep_their_binds() {
    let db = connect().await;
    let pool = db.pool();
    let subject = unique_subject("scope");

    for payload in ["one", "two"] {
        Checkpoint::create(
            pool,
            NewCheckpoint {
                owner_name: "scoped".to_string(),
                payload: payload.to_string(),
                owner_id: Some(subject.clone()),
            },
        )
        .await
        .expect("create failed");
    }

    let count = Checkpoint::scope()
        .owned_by(subject.clone())
        .count(pool)
        .await
        .expect("count failed");
    assert_eq!(count, 2);

    assert!(Checkpoint::scope()
        .owned_by(subject.clone())
        .exists(pool)
        .await
        .expect("exists failed"));
    assert!(!Checkpoint::scope()
        .owned_by("nobody-at-all")
        .exists(pool)
        .await
        .expect("exists failed"));

    // Cleanup the rows this test created
    let rows = Checkpoint::scope()
        .owned_by(subject.clone())
        .all(pool)
        .await
        .expect("list failed");
    for row in rows {
        Checkpoint::delete(pool, row.id, None).await.expect("cleanup failed");
    }

    db.close().await;
}
