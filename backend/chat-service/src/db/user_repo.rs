/// User repository - handles all database operations for users
use crate::models::User;
use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

/// Create a new user in the database
pub async fn create_user<'e, E>(
    executor: E,
    email: &str,
    username: &str,
    hashed_password: &str,
    now: DateTime<Utc>,
) -> Result<User, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, email, hashed_password, is_active, is_superuser, is_verified, is_online, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, 1, 0, 0, 0, ?5, ?5)
        RETURNING id, username, email, hashed_password, is_active, is_superuser, is_verified, is_online, last_active_at, created_at, updated_at, deleted_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email.to_lowercase())
    .bind(hashed_password)
    .bind(now)
    .fetch_one(executor)
    .await
}

/// Find a user by ID
pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, hashed_password, is_active, is_superuser, is_verified, is_online, last_active_at, created_at, updated_at, deleted_at
        FROM users
        WHERE id = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Find a user by email
pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, hashed_password, is_active, is_superuser, is_verified, is_online, last_active_at, created_at, updated_at, deleted_at
        FROM users
        WHERE email = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(email.to_lowercase())
    .fetch_optional(executor)
    .await
}

/// Find a user by username
pub async fn find_by_username<'e, E>(
    executor: E,
    username: &str,
) -> Result<Option<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, hashed_password, is_active, is_superuser, is_verified, is_online, last_active_at, created_at, updated_at, deleted_at
        FROM users
        WHERE username = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(username)
    .fetch_optional(executor)
    .await
}

/// Find a user by login identifier: email if it contains `@`, username otherwise
pub async fn find_by_login<'e, E>(executor: E, login: &str) -> Result<Option<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    if login.contains('@') {
        find_by_email(executor, login).await
    } else {
        find_by_username(executor, login).await
    }
}

/// Active users ordered by username, optionally excluding one (usually the caller)
pub async fn list_users<'e, E>(
    executor: E,
    exclude: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, hashed_password, is_active, is_superuser, is_verified, is_online, last_active_at, created_at, updated_at, deleted_at
        FROM users
        WHERE deleted_at IS NULL
          AND is_active = 1
          AND (?1 IS NULL OR id != ?1)
        ORDER BY username ASC
        LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(exclude)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

/// Users currently flagged online
pub async fn list_online<'e, E>(executor: E) -> Result<Vec<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, hashed_password, is_active, is_superuser, is_verified, is_online, last_active_at, created_at, updated_at, deleted_at
        FROM users
        WHERE deleted_at IS NULL AND is_active = 1 AND is_online = 1
        ORDER BY last_active_at DESC
        "#,
    )
    .fetch_all(executor)
    .await
}

/// Check if email is already taken, ignoring `except` (for profile updates)
pub async fn email_exists<'e, E>(
    executor: E,
    email: &str,
    except: Option<Uuid>,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM users
            WHERE email = ?1 AND deleted_at IS NULL AND (?2 IS NULL OR id != ?2)
        )
        "#,
    )
    .bind(email.to_lowercase())
    .bind(except)
    .fetch_one(executor)
    .await
}

/// Check if username is already taken, ignoring `except`
pub async fn username_exists<'e, E>(
    executor: E,
    username: &str,
    except: Option<Uuid>,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM users
            WHERE username = ?1 AND deleted_at IS NULL AND (?2 IS NULL OR id != ?2)
        )
        "#,
    )
    .bind(username)
    .bind(except)
    .fetch_one(executor)
    .await
}

/// Update username and/or email; `None` keeps the current value
pub async fn update_profile<'e, E>(
    executor: E,
    user_id: Uuid,
    username: Option<&str>,
    email: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Option<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET username = COALESCE(?1, username),
            email = COALESCE(?2, email),
            updated_at = ?3
        WHERE id = ?4 AND deleted_at IS NULL
        RETURNING id, username, email, hashed_password, is_active, is_superuser, is_verified, is_online, last_active_at, created_at, updated_at, deleted_at
        "#,
    )
    .bind(username)
    .bind(email.map(|e| e.to_lowercase()))
    .bind(now)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Grant or revoke superuser rights
pub async fn set_superuser<'e, E>(
    executor: E,
    user_id: Uuid,
    is_superuser: bool,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE users SET is_superuser = ?1, updated_at = ?2
        WHERE id = ?3 AND deleted_at IS NULL
        "#,
    )
    .bind(is_superuser)
    .bind(now)
    .bind(user_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Mark the user online and stamp their last activity
pub async fn touch_presence<'e, E>(
    executor: E,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE users SET is_online = 1, last_active_at = ?1
        WHERE id = ?2 AND deleted_at IS NULL
        "#,
    )
    .bind(now)
    .bind(user_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn set_offline<'e, E>(executor: E, user_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("UPDATE users SET is_online = 0 WHERE id = ?1")
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Flip online users whose last activity is older than `cutoff` (or unknown) to offline
pub async fn mark_stale_offline<'e, E>(
    executor: E,
    cutoff: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE users SET is_online = 0
        WHERE is_online = 1
          AND deleted_at IS NULL
          AND (last_active_at IS NULL OR last_active_at < ?1)
        "#,
    )
    .bind(cutoff)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Flip offline users active since `cutoff` to online
pub async fn mark_recent_online<'e, E>(
    executor: E,
    cutoff: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE users SET is_online = 1
        WHERE is_online = 0
          AND deleted_at IS NULL
          AND last_active_at IS NOT NULL
          AND last_active_at >= ?1
        "#,
    )
    .bind(cutoff)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Soft delete a user
pub async fn soft_delete<'e, E>(
    executor: E,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE users
        SET deleted_at = ?1, is_active = 0, is_online = 0, updated_at = ?1
        WHERE id = ?2 AND deleted_at IS NULL
        "#,
    )
    .bind(now)
    .bind(user_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
