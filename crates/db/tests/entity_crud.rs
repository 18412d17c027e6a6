//! Integration tests for the repository layer against a real database:
//! - Workspace creation with owner membership
//! - Project CRUD, tenant scoping and unique names
//! - Keyword counter maintenance
//! - Cascade deletes
//! - Subscription and usage snapshot upserts

use chrono::{NaiveDate, TimeZone, Utc};
use rankforge_core::keywords::apply_rank_observation;
use rankforge_core::usage::DailyUsage;
use rankforge_db::models::client::CreateClient;
use rankforge_db::models::content_brief::CreateContentBrief;
use rankforge_db::models::keyword::CreateKeywords;
use rankforge_db::models::project::{CreateProject, UpdateProject};
use rankforge_db::models::subscription::UpsertSubscription;
use rankforge_db::models::usage::{CreateUsageEvent, UsageQuery};
use rankforge_db::models::user::CreateUser;
use rankforge_db::models::workspace::Workspace;
use rankforge_db::repositories::{
    ClientRepo, ContentBriefRepo, KeywordRepo, ProjectRepo, SeoAuditRepo, SubscriptionRepo, UsageRepo, UserRepo,
    WorkspaceRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_workspace(pool: &PgPool, email: &str, slug: &str) -> Workspace {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            name: "Test User".to_string(),
            password_hash: "$argon2id$stub".to_string(),
        },
    )
    .await
    .unwrap();
    WorkspaceRepo::create_with_owner(pool, "Acme", slug, user.id, None)
        .await
        .unwrap()
}

fn new_project(name: &str) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        domain: None,
        description: None,
        client_id: None,
    }
}

// ---------------------------------------------------------------------------
// Workspaces
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_workspace_creator_is_owner(pool: PgPool) {
    let ws = seed_workspace(&pool, "owner@example.com", "acme").await;
    assert_eq!(ws.plan, "free");

    let role = WorkspaceRepo::find_member_role(&pool, ws.id, ws.owner_id)
        .await
        .unwrap();
    assert_eq!(role.as_deref(), Some("owner"));

    let mine = WorkspaceRepo::list_for_user(&pool, ws.owner_id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].role, "owner");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_creates_user_and_workspace_atomically(pool: PgPool) {
    let input = CreateUser {
        email: "new@example.com".to_string(),
        name: "New".to_string(),
        password_hash: "$argon2id$stub".to_string(),
    };
    let (user, ws) = UserRepo::create_with_workspace(&pool, &input, "New's workspace", "new-ws")
        .await
        .unwrap();
    assert_eq!(ws.owner_id, user.id);

    // Same email in different case is rejected and leaves no second workspace behind.
    let dup = CreateUser {
        email: "NEW@example.com".to_string(),
        ..input
    };
    assert!(UserRepo::create_with_workspace(&pool, &dup, "Dup", "dup-ws")
        .await
        .is_err());
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workspaces")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_email_lookup_is_case_insensitive(pool: PgPool) {
    seed_workspace(&pool, "Mixed@Example.com", "mixed").await;
    let found = UserRepo::find_by_email(&pool, "mixed@example.com")
        .await
        .unwrap();
    assert!(found.is_some());
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_project_without_domain_round_trips(pool: PgPool) {
    let ws = seed_workspace(&pool, "a@example.com", "a").await;
    let created = ProjectRepo::create(&pool, ws.id, &new_project("Marketing site"))
        .await
        .unwrap();
    assert_eq!(created.domain, None);
    assert_eq!(created.keyword_count, 0);

    let fetched = ProjectRepo::find_by_id(&pool, ws.id, created.id)
        .await
        .unwrap()
        .expect("project should exist");
    assert_eq!(fetched.name, "Marketing site");
    assert_eq!(fetched.domain, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_project_is_invisible_to_other_workspaces(pool: PgPool) {
    let ws_a = seed_workspace(&pool, "a@example.com", "a").await;
    let ws_b = seed_workspace(&pool, "b@example.com", "b").await;
    let project = ProjectRepo::create(&pool, ws_a.id, &new_project("Private"))
        .await
        .unwrap();

    assert!(ProjectRepo::find_by_id(&pool, ws_b.id, project.id)
        .await
        .unwrap()
        .is_none());
    assert!(!ProjectRepo::delete(&pool, ws_b.id, project.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_project_name_rejected_per_workspace(pool: PgPool) {
    let ws_a = seed_workspace(&pool, "a@example.com", "a").await;
    let ws_b = seed_workspace(&pool, "b@example.com", "b").await;

    ProjectRepo::create(&pool, ws_a.id, &new_project("Blog"))
        .await
        .unwrap();
    let dup = ProjectRepo::create(&pool, ws_a.id, &new_project("Blog")).await;
    let err = dup.expect_err("duplicate name should fail");
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_projects_workspace_name"));

    // The same name in another workspace is fine.
    ProjectRepo::create(&pool, ws_b.id, &new_project("Blog"))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_project_keeps_unset_fields(pool: PgPool) {
    let ws = seed_workspace(&pool, "a@example.com", "a").await;
    let project = ProjectRepo::create(
        &pool,
        ws.id,
        &CreateProject {
            domain: Some("example.com".to_string()),
            ..new_project("Before")
        },
    )
    .await
    .unwrap();

    let updated = ProjectRepo::update(
        &pool,
        ws.id,
        project.id,
        &UpdateProject {
            name: Some("After".to_string()),
            domain: None,
            description: Some("Desc".to_string()),
            client_id: None,
        },
    )
    .await
    .unwrap()
    .expect("Update should return the row");

    assert_eq!(updated.name, "After");
    assert_eq!(updated.domain.as_deref(), Some("example.com"));
    assert_eq!(updated.description.as_deref(), Some("Desc"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deleting_client_detaches_projects(pool: PgPool) {
    let ws = seed_workspace(&pool, "a@example.com", "a").await;
    let client = ClientRepo::create(
        &pool,
        ws.id,
        &CreateClient {
            name: "Globex".to_string(),
            contact_email: None,
            website: None,
            notes: None,
        },
    )
    .await
    .unwrap();
    let project = ProjectRepo::create(
        &pool,
        ws.id,
        &CreateProject {
            client_id: Some(client.id),
            ..new_project("Globex site")
        },
    )
    .await
    .unwrap();

    assert!(ClientRepo::delete(&pool, ws.id, client.id).await.unwrap());
    let project = ProjectRepo::find_by_id(&pool, ws.id, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(project.client_id, None);
}

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_keyword_count_tracks_inserts_and_deletes(pool: PgPool) {
    let ws = seed_workspace(&pool, "a@example.com", "a").await;
    let project = ProjectRepo::create(&pool, ws.id, &new_project("Shop"))
        .await
        .unwrap();

    let terms = vec!["running shoes".to_string(), "trail shoes".to_string()];
    let created = KeywordRepo::create_batch(&pool, project.id, &terms)
        .await
        .unwrap();
    assert_eq!(created.len(), 2);

    // Re-adding an existing term only inserts the new one.
    let again = vec!["trail shoes".to_string(), "road shoes".to_string()];
    let created_again = KeywordRepo::create_batch(&pool, project.id, &again)
        .await
        .unwrap();
    assert_eq!(created_again.len(), 1);
    assert_eq!(created_again[0].term, "road shoes");

    let project_now = ProjectRepo::find_by_id(&pool, ws.id, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(project_now.keyword_count, 3);

    assert!(KeywordRepo::delete(&pool, project.id, created[0].id).await.unwrap());
    assert!(!KeywordRepo::delete(&pool, project.id, created[0].id).await.unwrap());

    let project_now = ProjectRepo::find_by_id(&pool, ws.id, project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(project_now.keyword_count, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_rank_update_is_persisted(pool: PgPool) {
    let ws = seed_workspace(&pool, "a@example.com", "a").await;
    let project = ProjectRepo::create(&pool, ws.id, &new_project("Shop"))
        .await
        .unwrap();
    let kw = KeywordRepo::create_batch(&pool, project.id, &["boots".to_string()])
        .await
        .unwrap()
        .remove(0);

    let update = apply_rank_observation(kw.current_position, kw.best_position, Some(7));
    let kw = KeywordRepo::record_rank(&pool, kw.id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kw.current_position, Some(7));
    assert_eq!(kw.best_position, Some(7));
    assert!(kw.last_checked_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deleting_project_cascades(pool: PgPool) {
    let ws = seed_workspace(&pool, "a@example.com", "a").await;
    let project = ProjectRepo::create(&pool, ws.id, &new_project("Gone"))
        .await
        .unwrap();
    let payload = CreateKeywords {
        terms: vec!["x".to_string()],
    };
    let kw = KeywordRepo::create_batch(&pool, project.id, &payload.terms)
        .await
        .unwrap()
        .remove(0);
    let audit = SeoAuditRepo::create_pending(&pool, project.id, "https://gone.test/", None)
        .await
        .unwrap();

    assert!(ProjectRepo::delete(&pool, ws.id, project.id).await.unwrap());
    assert!(KeywordRepo::find_by_id(&pool, project.id, kw.id)
        .await
        .unwrap()
        .is_none());
    assert!(SeoAuditRepo::find_by_id(&pool, project.id, audit.id)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Audits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_failed_audit_keeps_error_message(pool: PgPool) {
    let ws = seed_workspace(&pool, "a@example.com", "a").await;
    let project = ProjectRepo::create(&pool, ws.id, &new_project("Site"))
        .await
        .unwrap();
    let audit = SeoAuditRepo::create_pending(&pool, project.id, "https://site.test/", None)
        .await
        .unwrap();
    assert_eq!(audit.status, "pending");

    let failed = SeoAuditRepo::fail(&pool, audit.id, "connection refused")
        .await
        .unwrap();
    assert_eq!(failed.status, "failed");
    assert_eq!(failed.error_message.as_deref(), Some("connection refused"));
    assert!(failed.completed_at.is_some());

    let month_start = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
    let count = SeoAuditRepo::count_for_workspace_since(&pool, ws.id, month_start)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

// ---------------------------------------------------------------------------
// Briefs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_abandoned_generation_can_be_reclaimed(pool: PgPool) {
    let ws = seed_workspace(&pool, "a@example.com", "a").await;
    let project = ProjectRepo::create(&pool, ws.id, &new_project("Site"))
        .await
        .unwrap();
    let brief = ContentBriefRepo::create(
        &pool,
        project.id,
        &CreateContentBrief {
            target_keyword: "rust seo".to_string(),
            title: None,
            keyword_id: None,
        },
        None,
    )
    .await
    .unwrap();

    let started = ContentBriefRepo::start_generation(&pool, brief.id, 600)
        .await
        .unwrap();
    assert_eq!(started.unwrap().status, "generating");
    let again = ContentBriefRepo::start_generation(&pool, brief.id, 600)
        .await
        .unwrap();
    assert!(again.is_none());

    // Age the row past the stale window without the trigger resetting it.
    sqlx::query("ALTER TABLE content_briefs DISABLE TRIGGER set_updated_at")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE content_briefs SET updated_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(brief.id)
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("ALTER TABLE content_briefs ENABLE TRIGGER set_updated_at")
        .execute(&pool)
        .await
        .unwrap();

    let reclaimed = ContentBriefRepo::start_generation(&pool, brief.id, 600)
        .await
        .unwrap();
    assert_eq!(reclaimed.unwrap().status, "generating");
}

// ---------------------------------------------------------------------------
// Billing & usage
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_subscription_upsert_keeps_existing_refs(pool: PgPool) {
    let ws = seed_workspace(&pool, "a@example.com", "a").await;
    SubscriptionRepo::upsert(
        &pool,
        &UpsertSubscription {
            workspace_id: ws.id,
            plan: "pro".to_string(),
            status: "active".to_string(),
            customer_ref: Some("cus_1".to_string()),
            subscription_ref: Some("sub_1".to_string()),
            current_period_end: None,
        },
    )
    .await
    .unwrap();

    let sub = SubscriptionRepo::upsert(
        &pool,
        &UpsertSubscription {
            workspace_id: ws.id,
            plan: "agency".to_string(),
            status: "active".to_string(),
            customer_ref: None,
            subscription_ref: None,
            current_period_end: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(sub.plan, "agency");
    assert_eq!(sub.subscription_ref.as_deref(), Some("sub_1"));

    let synced = SubscriptionRepo::update_by_subscription_ref(&pool, "sub_1", "free", "canceled", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(synced.status, "canceled");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_usage_snapshot_upsert_is_idempotent(pool: PgPool) {
    let ws = seed_workspace(&pool, "a@example.com", "a").await;
    UsageRepo::record(
        &pool,
        &CreateUsageEvent {
            workspace_id: ws.id,
            user_id: None,
            event_type: "audit_run",
            metadata: None,
        },
    )
    .await
    .unwrap();

    let now = Utc::now();
    let rows = UsageRepo::count_events(&pool, now - chrono::Duration::hours(1), now + chrono::Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].count, 1);

    let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
    let mut usage = DailyUsage {
        workspace_id: ws.id,
        audits_run: 1,
        total_events: 1,
        ..DailyUsage::default()
    };
    UsageRepo::upsert_snapshot(&pool, date, &usage).await.unwrap();
    usage.audits_run = 4;
    usage.total_events = 4;
    let snap = UsageRepo::upsert_snapshot(&pool, date, &usage).await.unwrap();
    assert_eq!(snap.audits_run, 4);

    let all = UsageRepo::list_snapshots(&pool, ws.id, &UsageQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}
