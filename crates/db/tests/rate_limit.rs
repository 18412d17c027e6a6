//! Integration tests for the database-backed rate limiter.

use chrono::{Duration, Utc};
use rankforge_core::rate_limit::{BucketKey, RateLimitRule};
use rankforge_db::repositories::RateLimitRepo;
use sqlx::PgPool;

const RULE: RateLimitRule = RateLimitRule::new("test", 3, 60);

fn bucket(ip: &str) -> BucketKey {
    BucketKey {
        workspace_id: Some(1),
        user_id: Some(2),
        ip_address: ip.to_string(),
        route: "/api/v1/workspaces/{workspace_id}/projects".to_string(),
        method: "POST".to_string(),
    }
}

async fn logged_rows(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM rate_limit_log")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_requests_beyond_limit_are_rejected_and_not_logged(pool: PgPool) {
    let key = bucket("10.0.0.1");
    for expected_remaining in [2, 1, 0] {
        let d = RateLimitRepo::check_and_record(&pool, &key, &RULE).await.unwrap();
        assert!(d.allowed);
        assert_eq!(d.remaining, expected_remaining);
    }

    let rejected = RateLimitRepo::check_and_record(&pool, &key, &RULE).await.unwrap();
    assert!(!rejected.allowed);
    assert!(rejected.retry_after_secs.is_some());
    assert_eq!(logged_rows(&pool).await, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_buckets_are_independent(pool: PgPool) {
    for _ in 0..3 {
        RateLimitRepo::check_and_record(&pool, &bucket("10.0.0.1"), &RULE)
            .await
            .unwrap();
    }
    let other = RateLimitRepo::check_and_record(&pool, &bucket("10.0.0.2"), &RULE)
        .await
        .unwrap();
    assert!(other.allowed);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_requests_never_exceed_limit(pool: PgPool) {
    let mut handles = Vec::new();
    for _ in 0..12 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            RateLimitRepo::check_and_record(&pool, &bucket("10.0.0.9"), &RULE)
                .await
                .unwrap()
                .allowed
        }));
    }

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap() {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 3);
    assert_eq!(logged_rows(&pool).await, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_prune_removes_only_old_rows(pool: PgPool) {
    RateLimitRepo::check_and_record(&pool, &bucket("10.0.0.1"), &RULE)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO rate_limit_log (bucket_key, ip_address, route, method, created_at)
         VALUES ('old', '10.0.0.1', '/x', 'GET', NOW() - INTERVAL '2 hours')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let pruned = RateLimitRepo::prune_older_than(&pool, Utc::now() - Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(pruned, 1);
    assert_eq!(logged_rows(&pool).await, 1);
}
