/// Participant repository
use crate::models::{InvitationRead, Participant, ParticipantDetail, ParticipantStatus};
use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

/// Fields of a participant row to insert
#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub user_id: Uuid,
    pub conversation_id: Uuid,
    pub status: ParticipantStatus,
    pub invited_by_user_id: Option<Uuid>,
    pub initial_message_id: Option<Uuid>,
    pub joined_at: Option<DateTime<Utc>>,
}

pub async fn create_participant<'e, E>(
    executor: E,
    new: &NewParticipant,
    now: DateTime<Utc>,
) -> Result<Participant, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Participant>(
        r#"
        INSERT INTO participants (id, user_id, conversation_id, status, invited_by_user_id, initial_message_id, created_at, updated_at, joined_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8)
        RETURNING id, user_id, conversation_id, status, invited_by_user_id, initial_message_id, created_at, updated_at, joined_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(new.conversation_id)
    .bind(new.status)
    .bind(new.invited_by_user_id)
    .bind(new.initial_message_id)
    .bind(now)
    .bind(new.joined_at)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(
    executor: E,
    participant_id: Uuid,
) -> Result<Option<Participant>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Participant>(
        r#"
        SELECT id, user_id, conversation_id, status, invited_by_user_id, initial_message_id, created_at, updated_at, joined_at
        FROM participants
        WHERE id = ?1
        "#,
    )
    .bind(participant_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_user_and_conversation<'e, E>(
    executor: E,
    user_id: Uuid,
    conversation_id: Uuid,
) -> Result<Option<Participant>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Participant>(
        r#"
        SELECT id, user_id, conversation_id, status, invited_by_user_id, initial_message_id, created_at, updated_at, joined_at
        FROM participants
        WHERE user_id = ?1 AND conversation_id = ?2
        "#,
    )
    .bind(user_id)
    .bind(conversation_id)
    .fetch_optional(executor)
    .await
}

/// Participant with the user's name and presence
pub async fn find_detail_by_id<'e, E>(
    executor: E,
    participant_id: Uuid,
) -> Result<Option<ParticipantDetail>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, ParticipantDetail>(
        r#"
        SELECT p.id, p.user_id, u.username AS username, u.is_online AS is_online,
               p.conversation_id, p.status, p.invited_by_user_id, p.initial_message_id,
               p.created_at, p.joined_at
        FROM participants p
        JOIN users u ON u.id = p.user_id
        WHERE p.id = ?1 AND u.deleted_at IS NULL
        "#,
    )
    .bind(participant_id)
    .fetch_optional(executor)
    .await
}

pub async fn list_for_conversation<'e, E>(
    executor: E,
    conversation_id: Uuid,
) -> Result<Vec<ParticipantDetail>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, ParticipantDetail>(
        r#"
        SELECT p.id, p.user_id, u.username AS username, u.is_online AS is_online,
               p.conversation_id, p.status, p.invited_by_user_id, p.initial_message_id,
               p.created_at, p.joined_at
        FROM participants p
        JOIN users u ON u.id = p.user_id
        WHERE p.conversation_id = ?1 AND u.deleted_at IS NULL
        ORDER BY p.created_at ASC, p.rowid ASC
        "#,
    )
    .bind(conversation_id)
    .fetch_all(executor)
    .await
}

/// Pending invitations addressed to a user, newest first
pub async fn list_invitations_for_user<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<InvitationRead>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, InvitationRead>(
        r#"
        SELECT p.id AS participant_id,
               c.id AS conversation_id,
               c.slug AS conversation_slug,
               c.name AS conversation_name,
               p.invited_by_user_id AS invited_by_user_id,
               inviter.username AS invited_by_username,
               m.content AS initial_message,
               p.created_at AS created_at
        FROM participants p
        JOIN conversations c ON c.id = p.conversation_id
        LEFT JOIN users inviter
            ON inviter.id = p.invited_by_user_id AND inviter.deleted_at IS NULL
        LEFT JOIN messages m ON m.id = p.initial_message_id
        WHERE p.user_id = ?1 AND p.status = ?2 AND c.deleted_at IS NULL
        ORDER BY p.created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(ParticipantStatus::Invited)
    .fetch_all(executor)
    .await
}

/// Write a new status. Guarded on `expected` so a concurrent answer loses
/// instead of overwriting; returns None when the guard did not match.
pub async fn update_status<'e, E>(
    executor: E,
    participant_id: Uuid,
    expected: ParticipantStatus,
    status: ParticipantStatus,
    joined_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<Option<Participant>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Participant>(
        r#"
        UPDATE participants
        SET status = ?1, joined_at = COALESCE(?2, joined_at), updated_at = ?3
        WHERE id = ?4 AND status = ?5
        RETURNING id, user_id, conversation_id, status, invited_by_user_id, initial_message_id, created_at, updated_at, joined_at
        "#,
    )
    .bind(status)
    .bind(joined_at)
    .bind(now)
    .bind(participant_id)
    .bind(expected)
    .fetch_optional(executor)
    .await
}
