//! Integration tests for the database connection and the student repository
//!
//! These tests run against in-memory and temporary-file SQLite databases.
//!
//! Run with: cargo test --package rollcall-storage --test integration_database

use rollcall_biometric::FingerprintTemplate;
use rollcall_storage::{
    Database, DatabaseConfig, SqliteStudentRepository, StorageError, StudentRepository,
};
use rstest::rstest;
use std::sync::Arc;
use tokio::sync::Barrier;

async fn repository() -> SqliteStudentRepository {
    let db = Database::in_memory().await.unwrap();
    SqliteStudentRepository::new(db.pool().clone())
}

fn capture(fill: u8) -> FingerprintTemplate {
    FingerprintTemplate::from_capture(&[fill; 512])
}

#[tokio::test]
async fn test_in_memory_database() {
    let db = Database::in_memory().await.unwrap();
    db.health_check().await.unwrap();
    db.close().await;
}

#[tokio::test]
async fn test_migration_idempotency() {
    let db = Database::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    db.migrate().await.unwrap();
    db.health_check().await.unwrap();
}

#[tokio::test]
async fn test_file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("rollcall.db");

    {
        let db = Database::open(DatabaseConfig::new(&path)).await.unwrap();
        let repo = SqliteStudentRepository::new(db.pool().clone());
        repo.create_student("Ada Obi", "S-001").await.unwrap();
        repo.update_fingerprint("S-001", &capture(7)).await.unwrap();
        db.close().await;
    }

    let db = Database::open(DatabaseConfig::new(&path)).await.unwrap();
    let repo = SqliteStudentRepository::new(db.pool().clone());
    let student = repo.find_by_code("S-001").await.unwrap().unwrap();

    assert!(student.fingerprint_enrolled);
    assert_eq!(student.fingerprint_data, Some(capture(7).template));
    db.close().await;
}

#[tokio::test]
async fn test_enroll_round_trip() {
    let repo = repository().await;
    repo.create_student("Ada Obi", "S-001").await.unwrap();

    let mut bytes = vec![0x10u8; 256];
    bytes.extend(vec![0x20u8; 256]);
    let template = FingerprintTemplate::from_capture(&bytes);
    repo.update_fingerprint("S-001", &template).await.unwrap();

    let student = repo.find_by_code("S-001").await.unwrap().unwrap();
    assert!(student.fingerprint_enrolled);
    assert_eq!(student.fingerprint_quality, Some(80));
    assert!(student.enrolled_at.is_some());

    let stored = student.fingerprint().unwrap();
    assert_eq!(stored.template, template.template);
    assert_eq!(stored.decode().unwrap(), bytes);
}

#[tokio::test]
async fn test_reenroll_replaces_template() {
    let repo = repository().await;
    repo.create_student("Ada Obi", "S-001").await.unwrap();

    repo.update_fingerprint("S-001", &capture(1)).await.unwrap();
    repo.update_fingerprint("S-001", &capture(2)).await.unwrap();

    let student = repo.find_by_code("S-001").await.unwrap().unwrap();
    assert_eq!(student.enrolled_template(), Some(capture(2).template.as_str()));
    assert!(repo.find_by_fingerprint(&capture(1).template).await.unwrap().is_none());
}

#[tokio::test]
async fn test_remove_fingerprint_clears_enrollment() {
    let repo = repository().await;
    repo.create_student("Ada Obi", "S-001").await.unwrap();
    repo.update_fingerprint("S-001", &capture(9)).await.unwrap();

    repo.remove_fingerprint("S-001").await.unwrap();

    let student = repo.find_by_code("S-001").await.unwrap().unwrap();
    assert!(!student.fingerprint_enrolled);
    assert_eq!(student.fingerprint_data, None);
    assert_eq!(student.fingerprint_quality, None);
    assert!(repo.find_enrolled().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_find_by_fingerprint_exact_match_only() {
    let repo = repository().await;
    repo.create_student("Ada Obi", "S-001").await.unwrap();
    repo.create_student("Bola Ade", "S-002").await.unwrap();
    repo.update_fingerprint("S-002", &capture(3)).await.unwrap();

    let found = repo.find_by_fingerprint(&capture(3).template).await.unwrap();
    assert_eq!(found.map(|s| s.student_code), Some("S-002".to_string()));

    let missing = repo.find_by_fingerprint(&capture(4).template).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_find_enrolled_in_id_order() {
    let repo = repository().await;
    for (name, code) in [("Ada", "S-001"), ("Bola", "S-002"), ("Chidi", "S-003")] {
        repo.create_student(name, code).await.unwrap();
    }
    repo.update_fingerprint("S-003", &capture(3)).await.unwrap();
    repo.update_fingerprint("S-001", &capture(1)).await.unwrap();

    let codes: Vec<String> = repo
        .find_enrolled()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.student_code)
        .collect();
    assert_eq!(codes, vec!["S-001", "S-003"]);
}

#[rstest]
#[case("update")]
#[case("remove")]
#[tokio::test]
async fn test_fingerprint_ops_on_unknown_student(#[case] op: &str) {
    let repo = repository().await;

    let result = match op {
        "update" => repo.update_fingerprint("ghost", &capture(1)).await,
        _ => repo.remove_fingerprint("ghost").await,
    };

    assert!(matches!(result, Err(StorageError::NotFound { .. })));
}

#[tokio::test]
async fn test_concurrent_lookups() {
    let db = Database::in_memory().await.unwrap();
    let repo = Arc::new(SqliteStudentRepository::new(db.pool().clone()));
    repo.create_student("Ada Obi", "S-001").await.unwrap();

    const NUM_CONCURRENT_TASKS: usize = 8;
    let barrier = Arc::new(Barrier::new(NUM_CONCURRENT_TASKS));

    let handles: Vec<_> = (0..NUM_CONCURRENT_TASKS)
        .map(|_| {
            let repo = repo.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                repo.find_by_code("S-001").await.unwrap()
            })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        assert_eq!(result.unwrap().unwrap().name, "Ada Obi");
    }

    db.close().await;
}
