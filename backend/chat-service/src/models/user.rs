use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Row in the `users` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub is_online: bool,
    pub last_active_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// The authenticated user's own view of their account
#[derive(Debug, Clone, Serialize)]
pub struct UserRead {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub is_online: bool,
    pub last_active_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// What other users get to see
#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub username: String,
    pub is_online: bool,
    pub last_active_at: Option<DateTime<Utc>>,
}

impl From<User> for UserRead {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            is_verified: user.is_verified,
            is_online: user.is_online,
            last_active_at: user.last_active_at,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_online: user.is_online,
            last_active_at: user.last_active_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            hashed_password: "$argon2id$v=19$secret".into(),
            is_active: true,
            is_superuser: false,
            is_verified: false,
            is_online: true,
            last_active_at: Some(now),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_user_read_never_serializes_password_hash() {
        let json = serde_json::to_value(UserRead::from(sample_user())).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["username"], "alice");
        assert_eq!(json["is_online"], true);
    }

    #[test]
    fn test_user_public_hides_email() {
        let json = serde_json::to_value(UserPublic::from(sample_user())).unwrap();
        assert!(json.get("email").is_none());
        assert_eq!(json["username"], "alice");
    }
}
