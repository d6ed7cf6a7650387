use crate::db::user_repo;
use crate::models::User;
use crate::services::{ServiceError, ServiceResult};
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

/// Outcome of one bulk presence refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceSweep {
    pub went_online: u64,
    pub went_offline: u64,
}

/// Tracks `is_online` / `last_active_at` for users
#[derive(Clone)]
pub struct PresenceService {
    pool: SqlitePool,
}

impl PresenceService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stamp activity for `user_id`. Returns false when no live user matched.
    pub async fn mark_active(&self, user_id: Uuid) -> ServiceResult<bool> {
        let updated = user_repo::touch_presence(&self.pool, user_id, Utc::now()).await?;
        debug!(user_id = %user_id, updated, "Presence refreshed");
        Ok(updated > 0)
    }

    pub async fn mark_offline(&self, user_id: Uuid) -> ServiceResult<bool> {
        let updated = user_repo::set_offline(&self.pool, user_id).await?;
        Ok(updated > 0)
    }

    /// Users active within `timeout` are online, everybody else offline
    pub async fn update_all_users_online_status(
        &self,
        timeout: Duration,
    ) -> ServiceResult<PresenceSweep> {
        if timeout <= Duration::zero() {
            return Err(ServiceError::business_rule(
                "Presence timeout must be positive",
            ));
        }
        let cutoff = Utc::now()
            .checked_sub_signed(timeout)
            .ok_or_else(|| ServiceError::business_rule("Presence timeout is out of range"))?;

        let mut tx = self.pool.begin().await?;
        let went_offline = user_repo::mark_stale_offline(&mut *tx, cutoff).await?;
        let went_online = user_repo::mark_recent_online(&mut *tx, cutoff).await?;
        tx.commit().await?;

        let sweep = PresenceSweep {
            went_online,
            went_offline,
        };
        if went_online > 0 || went_offline > 0 {
            info!(went_online, went_offline, "Presence statuses updated");
        }
        Ok(sweep)
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Online according to the last activity stamp alone
    pub fn is_online(user: &User, timeout: Duration, now: DateTime<Utc>) -> bool {
        user.last_active_at
            .map(|at| now - at <= timeout)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{insert_user, test_pool};

    async fn backdate(pool: &SqlitePool, user_id: Uuid, at: DateTime<Utc>) {
        sqlx::query("UPDATE users SET last_active_at = ?1 WHERE id = ?2")
            .bind(at)
            .bind(user_id)
            .execute(pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mark_active_and_offline() {
        let pool = test_pool().await;
        let service = PresenceService::new(pool.clone());
        let user = insert_user(&pool, "alice").await;

        assert!(service.mark_active(user.id).await.unwrap());
        let online = user_repo::find_by_id(&pool, user.id).await.unwrap().unwrap();
        assert!(online.is_online);
        assert!(online.last_active_at.is_some());

        assert!(service.mark_offline(user.id).await.unwrap());
        let offline = user_repo::find_by_id(&pool, user.id).await.unwrap().unwrap();
        assert!(!offline.is_online);
    }

    #[tokio::test]
    async fn test_mark_active_unknown_user() {
        let service = PresenceService::new(test_pool().await);
        assert!(!service.mark_active(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_sweep_flips_both_ways() {
        let pool = test_pool().await;
        let service = PresenceService::new(pool.clone());
        let stale = insert_user(&pool, "stale").await;
        let fresh = insert_user(&pool, "fresh").await;
        let never = insert_user(&pool, "never").await;

        service.mark_active(stale.id).await.unwrap();
        backdate(&pool, stale.id, Utc::now() - Duration::minutes(30)).await;

        // active recently but flagged offline (e.g. after a previous sweep)
        backdate(&pool, fresh.id, Utc::now() - Duration::seconds(10)).await;

        let sweep = service
            .update_all_users_online_status(Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(
            sweep,
            PresenceSweep {
                went_online: 1,
                went_offline: 1
            }
        );

        let stale = user_repo::find_by_id(&pool, stale.id).await.unwrap().unwrap();
        let fresh = user_repo::find_by_id(&pool, fresh.id).await.unwrap().unwrap();
        let never = user_repo::find_by_id(&pool, never.id).await.unwrap().unwrap();
        assert!(!stale.is_online);
        assert!(fresh.is_online);
        assert!(!never.is_online);

        let again = service
            .update_all_users_online_status(Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(again, PresenceSweep::default());
    }

    #[tokio::test]
    async fn test_is_online_helper() {
        let pool = test_pool().await;
        let mut user = insert_user(&pool, "helper").await;
        let now = Utc::now();
        let timeout = Duration::minutes(5);

        assert!(!PresenceService::is_online(&user, timeout, now));

        user.last_active_at = Some(now - Duration::minutes(1));
        assert!(PresenceService::is_online(&user, timeout, now));

        user.last_active_at = Some(now - Duration::minutes(6));
        assert!(!PresenceService::is_online(&user, timeout, now));
    }

    #[tokio::test]
    async fn test_sweep_rejects_unusable_timeouts() {
        let pool = test_pool().await;
        let service = PresenceService::new(pool.clone());
        let user = insert_user(&pool, "bounded").await;
        service.mark_active(user.id).await.unwrap();

        for timeout in [
            Duration::zero(),
            Duration::seconds(-60),
            Duration::seconds(10_000_000_000_000),
        ] {
            let err = service
                .update_all_users_online_status(timeout)
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::BusinessRule(_)));
        }

        let user = user_repo::find_by_id(&pool, user.id).await.unwrap().unwrap();
        assert!(user.is_online);
    }
}
