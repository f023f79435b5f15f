//! Background sweep for intro session hygiene.
//!
//! Expired sessions stay invisible to every query from the moment they
//! expire; this task merely reclaims the rows and retires reminders that
//! were missed by more than a day.

use std::time::Duration;

use tokio::task::JoinHandle;

use dreamshepherd_db::repositories::IntroDreamerRepo;
use dreamshepherd_db::DbPool;

/// Spawn the periodic sweep. The returned handle is aborted at shutdown.
pub fn start_intro_sweep(pool: DbPool, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // First tick fires immediately; skip it so startup is quiet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            run_sweep(&pool).await;
        }
    })
}

/// One sweep pass. Failures are logged and retried on the next tick.
pub async fn run_sweep(pool: &DbPool) {
    match IntroDreamerRepo::delete_expired(pool).await {
        Ok(0) => {}
        Ok(reaped) => tracing::info!(reaped, "Reaped expired intro sessions"),
        Err(err) => tracing::error!(error = %err, "Failed to reap expired intro sessions"),
    }

    match IntroDreamerRepo::cleanup_missed_reminders(pool).await {
        Ok(0) => {}
        Ok(retired) => tracing::info!(retired, "Retired reminders missed by more than 24h"),
        Err(err) => tracing::error!(error = %err, "Failed to retire missed reminders"),
    }
}
