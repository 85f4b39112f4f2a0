use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use cmg_core::{CostPoint, human_timestamp, weighted_hourly_average};
use cmg_db::Db;
use tracing::{debug, warn};

use crate::types::{IngestError, Result};

/// Outcome of re-aggregating a node's trailing window.
#[derive(Debug, Default)]
pub struct WindowRefresh {
    pub written: usize,
    /// Hours that could not be refreshed, keyed by hour epoch.
    pub failures: Vec<(i64, IngestError)>,
}

impl WindowRefresh {
    pub fn failure_at(&self, hour_epoch: i64) -> Option<&IngestError> {
        self.failures
            .iter()
            .find(|(epoch, _)| *epoch == hour_epoch)
            .map(|(_, err)| err)
    }
}

/// Recomputes and upserts the weighted average of `node` for each of the
/// `hours` hours ending at `hour`, newest first. Hours without raw samples
/// are left untouched; an hour that fails is logged and does not stop the
/// others.
pub fn refresh_window(db: &Db, node: &str, hour: &DateTime<Tz>, hours: u32) -> WindowRefresh {
    let mut refresh = WindowRefresh::default();
    for back in 0..i64::from(hours.max(1)) {
        let start = hour.clone() - Duration::hours(back);
        let start_epoch = start.timestamp();
        match refresh_hour(db, node, &start) {
            Ok(true) => refresh.written += 1,
            Ok(false) => {}
            Err(err) => {
                warn!(
                    node,
                    hour_epoch = start_epoch,
                    error = %err,
                    "hourly aggregate not refreshed"
                );
                refresh.failures.push((start_epoch, err));
            }
        }
    }
    refresh
}

fn refresh_hour(db: &Db, node: &str, start: &DateTime<Tz>) -> Result<bool> {
    let start_epoch = start.timestamp();
    let samples = db.raw_samples_in_hour(node, start_epoch)?;
    let points: Vec<CostPoint> = samples.iter().map(CostPoint::from).collect();
    let Some(average) = weighted_hourly_average(&points, start_epoch)? else {
        return Ok(false);
    };
    db.upsert_hourly_aggregate(node, start_epoch, &human_timestamp(start), average)?;
    debug!(
        node,
        hour_epoch = start_epoch,
        samples = points.len(),
        average,
        "hourly aggregate upserted"
    );
    Ok(true)
}
