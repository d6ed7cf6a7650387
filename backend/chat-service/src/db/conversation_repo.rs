/// Conversation repository
use crate::models::{Conversation, ParticipantStatus};
use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

pub async fn create_conversation<'e, E>(
    executor: E,
    name: Option<&str>,
    slug: &str,
    created_by: Uuid,
    now: DateTime<Utc>,
) -> Result<Conversation, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Conversation>(
        r#"
        INSERT INTO conversations (id, name, slug, created_by_user_id, last_activity_at, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?5)
        RETURNING id, name, slug, created_by_user_id, last_activity_at, created_at, updated_at, deleted_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slug)
    .bind(created_by)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Conversation>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Conversation>(
        r#"
        SELECT id, name, slug, created_by_user_id, last_activity_at, created_at, updated_at, deleted_at
        FROM conversations
        WHERE id = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_slug<'e, E>(
    executor: E,
    slug: &str,
) -> Result<Option<Conversation>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Conversation>(
        r#"
        SELECT id, name, slug, created_by_user_id, last_activity_at, created_at, updated_at, deleted_at
        FROM conversations
        WHERE slug = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(slug)
    .fetch_optional(executor)
    .await
}

/// Conversations in which the user holds `status`, most recently active first
pub async fn list_for_user<'e, E>(
    executor: E,
    user_id: Uuid,
    status: ParticipantStatus,
) -> Result<Vec<Conversation>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Conversation>(
        r#"
        SELECT c.id, c.name, c.slug, c.created_by_user_id, c.last_activity_at, c.created_at, c.updated_at, c.deleted_at
        FROM conversations c
        JOIN participants p ON p.conversation_id = c.id
        WHERE p.user_id = ?1 AND p.status = ?2 AND c.deleted_at IS NULL
        ORDER BY c.last_activity_at DESC
        "#,
    )
    .bind(user_id)
    .bind(status)
    .fetch_all(executor)
    .await
}

pub async fn list_all<'e, E>(
    executor: E,
    limit: i64,
    offset: i64,
) -> Result<Vec<Conversation>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Conversation>(
        r#"
        SELECT id, name, slug, created_by_user_id, last_activity_at, created_at, updated_at, deleted_at
        FROM conversations
        WHERE deleted_at IS NULL
        ORDER BY last_activity_at DESC
        LIMIT ?1 OFFSET ?2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

/// Bump `last_activity_at`
pub async fn touch_activity<'e, E>(
    executor: E,
    conversation_id: Uuid,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE conversations SET last_activity_at = ?1, updated_at = ?1
        WHERE id = ?2 AND deleted_at IS NULL
        "#,
    )
    .bind(now)
    .bind(conversation_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
