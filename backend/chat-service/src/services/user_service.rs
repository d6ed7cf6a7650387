use crate::db::{self, user_repo};
use crate::models::User;
use crate::security::{hash_password, validate_password_strength, verify_password};
use crate::services::{ServiceError, ServiceResult};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Account management and credential checks
#[derive(Clone)]
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> ServiceResult<User> {
        validate_password_strength(password)?;

        if user_repo::email_exists(&self.pool, email, None).await? {
            return Err(ServiceError::conflict("REGISTER_USER_ALREADY_EXISTS"));
        }
        if user_repo::username_exists(&self.pool, username, None).await? {
            return Err(ServiceError::conflict("REGISTER_USERNAME_ALREADY_EXISTS"));
        }

        let hashed = hash_blocking(password.to_string()).await?;
        let user = user_repo::create_user(&self.pool, email, username, &hashed, Utc::now())
            .await
            .map_err(|e| {
                if db::is_unique_violation(&e) {
                    ServiceError::conflict("REGISTER_USER_ALREADY_EXISTS")
                } else {
                    ServiceError::Database(e)
                }
            })?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check credentials. `login` is an email address or a username.
    /// On success the user is marked online.
    pub async fn authenticate(&self, login: &str, password: &str) -> ServiceResult<User> {
        let user = user_repo::find_by_login(&self.pool, login.trim())
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        let hash = user.hashed_password.clone();
        let candidate = password.to_string();
        let valid =
            tokio::task::spawn_blocking(move || verify_password(&candidate, &hash)).await??;

        if !valid || !user.is_active {
            return Err(ServiceError::InvalidCredentials);
        }

        let now = Utc::now();
        user_repo::touch_presence(&self.pool, user.id, now).await?;

        info!(user_id = %user.id, "User logged in");
        Ok(User {
            is_online: true,
            last_active_at: Some(now),
            ..user
        })
    }

    pub async fn get_user(&self, user_id: Uuid) -> ServiceResult<User> {
        user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }

    pub async fn get_by_username(&self, username: &str) -> ServiceResult<User> {
        user_repo::find_by_username(&self.pool, username)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }

    /// Other active users, ordered by username
    pub async fn list_users(
        &self,
        requesting_user: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<User>> {
        Ok(user_repo::list_users(&self.pool, Some(requesting_user), limit, offset).await?)
    }

    pub async fn list_online_users(&self) -> ServiceResult<Vec<User>> {
        Ok(user_repo::list_online(&self.pool).await?)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        username: Option<&str>,
        email: Option<&str>,
    ) -> ServiceResult<User> {
        if let Some(email) = email {
            if user_repo::email_exists(&self.pool, email, Some(user_id)).await? {
                return Err(ServiceError::conflict("UPDATE_USER_EMAIL_ALREADY_EXISTS"));
            }
        }
        if let Some(username) = username {
            if user_repo::username_exists(&self.pool, username, Some(user_id)).await? {
                return Err(ServiceError::conflict(
                    "UPDATE_USER_USERNAME_ALREADY_EXISTS",
                ));
            }
        }

        let updated = user_repo::update_profile(&self.pool, user_id, username, email, Utc::now())
            .await
            .map_err(|e| {
                if db::is_unique_violation(&e) {
                    ServiceError::conflict("UPDATE_USER_ALREADY_EXISTS")
                } else {
                    ServiceError::Database(e)
                }
            })?;

        updated.ok_or(ServiceError::UserNotFound)
    }

    /// Soft delete the account. It disappears from every listing and can no
    /// longer log in.
    pub async fn deactivate_account(&self, user_id: Uuid) -> ServiceResult<()> {
        if user_repo::soft_delete(&self.pool, user_id, Utc::now()).await? == 0 {
            return Err(ServiceError::UserNotFound);
        }
        info!(user_id = %user_id, "User account deactivated");
        Ok(())
    }

    /// Grant or revoke superuser rights by email
    pub async fn set_superuser(&self, email: &str, is_superuser: bool) -> ServiceResult<User> {
        let user = user_repo::find_by_email(&self.pool, email)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        user_repo::set_superuser(&self.pool, user.id, is_superuser, Utc::now()).await?;
        info!(user_id = %user.id, is_superuser, "Superuser flag updated");

        Ok(User {
            is_superuser,
            ..user
        })
    }
}

async fn hash_blocking(password: String) -> ServiceResult<String> {
    Ok(tokio::task::spawn_blocking(move || hash_password(&password)).await??)
}
