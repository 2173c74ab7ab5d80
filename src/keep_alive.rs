//! Keep-alive pinger for hosts that idle quiet processes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Time to wait from `now` until the next fire time of `schedule`.
pub fn next_delay(schedule: &Schedule, now: DateTime<Utc>) -> Option<Duration> {
    let next = schedule.after(&now).next()?;
    (next - now).to_std().ok()
}

/// Ping `url` on every fire time of `schedule`, forever.
pub fn spawn(url: String, schedule: Schedule) -> JoinHandle<()> {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        info!("⏰ Keep-alive enabled for {}", url);

        loop {
            let Some(delay) = next_delay(&schedule, Utc::now()) else {
                warn!("Keep-alive schedule has no upcoming fire times, stopping");
                return;
            };
            tokio::time::sleep(delay).await;

            match client.get(&url).send().await {
                Ok(response) => info!("Keep-alive ping: {}", response.status()),
                Err(e) => warn!("Keep-alive ping failed: {}", e),
            }
        }
    })
}
