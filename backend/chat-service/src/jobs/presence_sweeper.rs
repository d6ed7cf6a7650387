//! Periodic bulk refresh of `is_online` flags.

use crate::metrics;
use crate::services::PresenceService;
use chrono::Duration as ChronoDuration;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Run `update_all_users_online_status` every `every`, until the pool closes
pub fn spawn_presence_sweeper(
    presence: PresenceService,
    online_timeout: ChronoDuration,
    every: Duration,
) -> JoinHandle<()> {
    info!(
        interval_secs = every.as_secs(),
        timeout_secs = online_timeout.num_seconds(),
        "Starting presence sweeper"
    );

    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if presence.is_closed() {
                debug!("Database pool closed, stopping presence sweeper");
                break;
            }
            run_once(&presence, online_timeout).await;
        }
    })
}

async fn run_once(presence: &PresenceService, online_timeout: ChronoDuration) {
    match presence.update_all_users_online_status(online_timeout).await {
        Ok(sweep) => {
            metrics::record_sweep(&sweep);
            debug!(
                went_online = sweep.went_online,
                went_offline = sweep.went_offline,
                "Presence sweep finished"
            );
        }
        Err(e) => {
            metrics::record_sweep_error();
            error!(error = %e, "Presence sweep failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::user_repo;
    use crate::services::test_support::{insert_user, test_pool};
    use chrono::Utc;

    #[tokio::test]
    async fn test_sweeper_marks_stale_users_offline() {
        let pool = test_pool().await;
        let presence = PresenceService::new(pool.clone());
        let user = insert_user(&pool, "sleepy").await;
        presence.mark_active(user.id).await.unwrap();

        sqlx::query("UPDATE users SET last_active_at = ?1 WHERE id = ?2")
            .bind(Utc::now() - ChronoDuration::hours(1))
            .bind(user.id)
            .execute(&pool)
            .await
            .unwrap();

        let handle = spawn_presence_sweeper(
            presence,
            ChronoDuration::minutes(5),
            Duration::from_millis(20),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        let user = user_repo::find_by_id(&pool, user.id).await.unwrap().unwrap();
        assert!(!user.is_online);
    }
}
