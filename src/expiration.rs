use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use tokio::task::JoinHandle;
use tracing::info;

use crate::campaign::manager;
use crate::database::Database;

/// The first occurrence of `at` (UTC) strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, at: NaiveTime) -> DateTime<Utc> {
    let today = Utc.from_utc_datetime(&now.date_naive().and_time(at));
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Spawns the task that deactivates expired campaigns once a day at `at`.
pub fn spawn_expiration_checker(db: Arc<dyn Database>, at: NaiveTime) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let next_run = next_run_after(now, at);
            info!(%next_run, "scheduled expired campaign check");

            let wait = (next_run - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            manager::deactivate_expired_campaigns(db.as_ref());
        }
    })
}
