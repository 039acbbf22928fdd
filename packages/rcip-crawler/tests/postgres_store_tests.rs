//! PostgreSQL store tests against a throwaway container.
//!
//! Run with: cargo test --test postgres_store_tests -- --ignored

#![cfg(feature = "postgres")]

use anyhow::{Context, Result};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;

use rcip_crawler::{JobFields, JobStore, PostgresStore, SkillTier, StoreError};

/// Keeps the container alive for the life of the store.
struct TestDb {
    store: PostgresStore,
    _postgres: ContainerAsync<Postgres>,
}

async fn start() -> Result<TestDb> {
    let postgres = Postgres::default()
        .with_tag("16")
        .start()
        .await
        .context("Failed to start Postgres container")?;

    let host = postgres.get_host().await?;
    let port = postgres.get_host_port_ipv4(5432).await?;
    let url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

    let store = PostgresStore::new(&url)
        .await
        .context("Failed to connect to Postgres")?;

    Ok(TestDb {
        store,
        _postgres: postgres,
    })
}

fn fields(title: &str) -> JobFields {
    JobFields {
        title: title.into(),
        description: "Maintain mill equipment".into(),
        occupation_code: Some("72400".into()),
        skill_tier: SkillTier::new(2),
        salary: Some(38.0),
        is_remote: false,
        location: "Timmins, ON".into(),
        posted_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 3),
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_employer_upsert_is_keyed_and_keeps_website() {
    let db = start().await.unwrap();
    let store = &db.store;

    let a = store.upsert_employer("Northern Mill", "Timmins", None).await.unwrap();
    let b = store
        .upsert_employer("Northern Mill", "Timmins", Some("https://mill.example/about"))
        .await
        .unwrap();
    let c = store.upsert_employer("Northern Mill", "Timmins", None).await.unwrap();
    let other = store.upsert_employer("Northern Mill", "Sudbury", None).await.unwrap();

    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_ne!(a, other);

    let employer = store.get_employer(a).await.unwrap().unwrap();
    assert_eq!(employer.website.as_deref(), Some("https://mill.example/about"));
    assert!(!employer.is_verified);

    let found = store.find_employer("Northern Mill", "Timmins").await.unwrap().unwrap();
    assert_eq!(found.id, a);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_job_upsert_is_idempotent() {
    let db = start().await.unwrap();
    let store = &db.store;

    let employer = store.upsert_employer("Northern Mill", "Timmins", None).await.unwrap();
    let first = store
        .upsert_job("https://jobs.example/mw", employer, &fields("Millwright"))
        .await
        .unwrap();
    let before = store.get_job(first).await.unwrap().unwrap();

    let second = store
        .upsert_job("https://jobs.example/mw", employer, &fields("Millwright"))
        .await
        .unwrap();
    let after = store.get_job(second).await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(before.updated_at, after.updated_at);
    assert_eq!(after.fields, fields("Millwright"));
    assert!(after.is_active);

    let third = store
        .upsert_job("https://jobs.example/mw", employer, &fields("Senior Millwright"))
        .await
        .unwrap();
    let changed = store.get_job(third).await.unwrap().unwrap();

    assert_eq!(first, third);
    assert_eq!(changed.fields.title, "Senior Millwright");
    assert!(changed.updated_at >= before.updated_at);
    assert_eq!(store.list_jobs(employer).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_job_for_unknown_employer_is_constraint_violation() {
    let db = start().await.unwrap();

    let err = db
        .store
        .upsert_job("https://jobs.example/x", rcip_crawler::EmployerId::new(), &fields("Cook"))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Constraint(_)));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_ping() {
    let db = start().await.unwrap();
    db.store.ping().await.unwrap();
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_schema_setup_is_repeatable_and_creates_index() {
    let db = start().await.unwrap();

    // Connecting again re-runs every schema statement against existing objects
    let again = PostgresStore::from_pool(db.store.pool().clone()).await.unwrap();

    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM pg_indexes WHERE indexname = 'idx_rcip_jobs_employer_id'",
    )
    .fetch_one(again.pool())
    .await
    .unwrap();
    assert_eq!(count, 1);
}
