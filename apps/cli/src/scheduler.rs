use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cmg_app::{AppState, current_hour};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Delay after the hour boundary before ticking, so the tick lands inside
/// the new hour.
const TICK_GRACE: Duration = Duration::from_secs(5);

/// Runs a tick now and then shortly after every hour boundary in the
/// configured timezone. The loop ends when the returned handle is aborted.
pub fn spawn_hourly(app_state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            run_tick(&app_state).await;
            let wait = match app_state.config.timezone() {
                Ok(tz) => until_next_hour(tz, Utc::now()) + TICK_GRACE,
                Err(err) => {
                    error!(error = %err, "scheduler stopped");
                    return;
                }
            };
            info!(seconds = wait.as_secs(), "next tick scheduled");
            tokio::time::sleep(wait).await;
        }
    })
}

async fn run_tick(app_state: &AppState) {
    let ingest = app_state.services.ingest.clone();
    match tokio::task::spawn_blocking(move || ingest.tick()).await {
        Ok(Ok(report)) => {
            let failed = report.failed_nodes();
            if failed > 0 {
                warn!(hour = %report.hour, failed, "tick finished with failed nodes");
            } else {
                info!(hour = %report.hour, "tick finished");
            }
        }
        Ok(Err(err)) => error!(error = %err, "tick could not run"),
        Err(err) => error!(error = %err, "tick task panicked"),
    }
}

fn until_next_hour(tz: Tz, now: DateTime<Utc>) -> Duration {
    let next = current_hour(tz, now) + chrono::Duration::hours(1);
    (next.with_timezone(&Utc) - now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}
