use chrono::Utc;
use cmg_core::{HourlyAggregate, LastKnownReading, NodeStatus, TrackingCheckpoint};
use cmg_db::Db;

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db, require_node};

/// Read side of the ingestion store, as consumed by the dashboard.
#[derive(Clone)]
pub struct ReadingsService {
    config: SharedConfig,
}

impl ReadingsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn latest_checkpoint(&self) -> Result<Option<TrackingCheckpoint>> {
        Ok(self.db()?.latest_checkpoint()?)
    }

    pub fn previous_document_change(&self) -> Result<Option<TrackingCheckpoint>> {
        Ok(self.db()?.previous_document_change()?)
    }

    pub fn last_reading(&self, node: &str) -> Result<Option<LastKnownReading>> {
        require_node(&self.config, node)?;
        Ok(self.db()?.last_known_reading(node)?)
    }

    pub fn aggregates(&self, hours: Option<u32>) -> Result<Vec<HourlyAggregate>> {
        self.aggregates_at(Utc::now().timestamp(), hours)
    }

    pub fn aggregates_at(&self, now: i64, hours: Option<u32>) -> Result<Vec<HourlyAggregate>> {
        let hours = hours.unwrap_or(self.config.settings.display_hours);
        if hours == 0 {
            return Err(AppError::InvalidInput(
                "hours must be greater than zero".to_string(),
            ));
        }
        Ok(self.db()?.hourly_aggregates_since(now, hours)?)
    }

    pub fn node_status(&self) -> Result<Vec<NodeStatus>> {
        let db = self.db()?;
        let mut statuses = Vec::with_capacity(self.config.settings.nodes.len());
        for node in &self.config.settings.nodes {
            let parameters = db.latest_parameter_snapshot(&node.plant)?;
            statuses.push(NodeStatus {
                node: node.id.clone(),
                plant: node.plant.clone(),
                last_reading: db.last_known_reading(&node.id)?,
                latest_weighted: db.latest_hourly_aggregate(&node.id)?,
                generating: parameters.as_ref().map(|snapshot| snapshot.generating),
                operational_cost: parameters
                    .as_ref()
                    .map(|snapshot| snapshot.operational_cost),
                base_operational_cost: parameters
                    .as_ref()
                    .map(|snapshot| snapshot.base_operational_cost()),
            });
        }
        Ok(statuses)
    }
}
