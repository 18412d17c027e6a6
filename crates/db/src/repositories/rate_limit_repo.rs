//! Repository for the `rate_limit_log` table.
//!
//! Each bucket is serialized with a transaction-scoped advisory lock keyed on
//! the bucket string, so the count and the insert of concurrent requests for
//! the same bucket cannot interleave.

use chrono::Utc;
use rankforge_core::rate_limit::{decide, BucketKey, Decision, RateLimitRule};
use rankforge_core::types::Timestamp;
use sqlx::PgPool;

pub struct RateLimitRepo;

impl RateLimitRepo {
    /// Count the bucket's requests inside the rule's window and, if the
    /// request is allowed, log it. Rejected requests are not logged.
    pub async fn check_and_record(
        pool: &PgPool,
        bucket: &BucketKey,
        rule: &RateLimitRule,
    ) -> Result<Decision, sqlx::Error> {
        let key = bucket.as_key();
        let now = Utc::now();
        let window_start = now - rule.window();

        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(&key)
            .execute(&mut *tx)
            .await?;

        let (count, oldest): (i64, Option<Timestamp>) = sqlx::query_as(
            "SELECT COUNT(*), MIN(created_at) FROM rate_limit_log
             WHERE bucket_key = $1 AND created_at > $2",
        )
        .bind(&key)
        .bind(window_start)
        .fetch_one(&mut *tx)
        .await?;

        let decision = decide(rule, count, oldest, now);

        if decision.allowed {
            sqlx::query(
                "INSERT INTO rate_limit_log
                    (bucket_key, workspace_id, user_id, ip_address, route, method, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(&key)
            .bind(bucket.workspace_id)
            .bind(bucket.user_id)
            .bind(&bucket.ip_address)
            .bind(&bucket.route)
            .bind(&bucket.method)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(decision)
    }

    /// Delete log rows created before `cutoff`. Returns the count of deleted rows.
    pub async fn prune_older_than(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rate_limit_log WHERE created_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
