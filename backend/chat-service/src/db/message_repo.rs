/// Message repository
use crate::models::{Message, MessageWithAuthor};
use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

/// SQLite treats a negative LIMIT as unbounded
pub const ALL_ROWS: i64 = -1;

pub async fn create_message<'e, E>(
    executor: E,
    conversation_id: Uuid,
    author_id: Uuid,
    content: &str,
    now: DateTime<Utc>,
) -> Result<Message, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (id, content, conversation_id, created_by_user_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, content, conversation_id, created_by_user_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(content)
    .bind(conversation_id)
    .bind(author_id)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(
    executor: E,
    message_id: Uuid,
) -> Result<Option<MessageWithAuthor>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, MessageWithAuthor>(
        r#"
        SELECT m.id, m.content, m.conversation_id, m.created_by_user_id,
               u.username AS author_username, m.created_at
        FROM messages m
        JOIN users u ON u.id = m.created_by_user_id
        WHERE m.id = ?1 AND u.deleted_at IS NULL
        "#,
    )
    .bind(message_id)
    .fetch_optional(executor)
    .await
}

/// Messages of a conversation in posting order
pub async fn list_for_conversation<'e, E>(
    executor: E,
    conversation_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<MessageWithAuthor>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, MessageWithAuthor>(
        r#"
        SELECT m.id, m.content, m.conversation_id, m.created_by_user_id,
               u.username AS author_username, m.created_at
        FROM messages m
        JOIN users u ON u.id = m.created_by_user_id
        WHERE m.conversation_id = ?1 AND u.deleted_at IS NULL
        ORDER BY m.created_at ASC, m.rowid ASC
        LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(conversation_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}
