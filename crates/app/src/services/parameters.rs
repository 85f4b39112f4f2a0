use cmg_core::ParameterSnapshot;
use cmg_db::Db;

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db};

const MAX_RECENT: u32 = 100;

#[derive(Clone)]
pub struct ParametersService {
    config: SharedConfig,
}

impl ParametersService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn latest(&self, plant: &str) -> Result<Option<ParameterSnapshot>> {
        if plant.trim().is_empty() {
            return Err(AppError::InvalidInput("plant is required".to_string()));
        }
        Ok(self.db()?.latest_parameter_snapshot(plant)?)
    }

    /// Most recent snapshots, newest first. `manual_only` drops rows written
    /// by the external updater.
    pub fn recent(&self, limit: u32, manual_only: bool) -> Result<Vec<ParameterSnapshot>> {
        if limit == 0 || limit > MAX_RECENT {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {MAX_RECENT}"
            )));
        }
        Ok(self.db()?.recent_parameter_snapshots(limit, manual_only)?)
    }

    pub fn record(&self, snapshot: &ParameterSnapshot) -> Result<i64> {
        if self
            .config
            .settings
            .nodes
            .iter()
            .all(|node| node.plant != snapshot.plant)
        {
            return Err(AppError::NotFound(format!(
                "plant {} is not monitored",
                snapshot.plant
            )));
        }
        Ok(self.db()?.insert_parameter_snapshot(snapshot)?)
    }
}
