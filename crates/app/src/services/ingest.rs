use chrono::{DateTime, Utc};
use cmg_ingest::{Orchestrator, SpoolSource, TickConfig, TickReport};

use crate::error::Result;
use crate::services::{SharedConfig, open_db};
use crate::util::time::parse_timezone;

#[derive(Clone)]
pub struct IngestService {
    config: SharedConfig,
}

impl IngestService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    pub fn tick(&self) -> Result<TickReport> {
        self.tick_at(Utc::now())
    }

    /// Runs one ingestion tick against the spool folder. Node failures are
    /// reported in the returned [`TickReport`]; only setup errors surface here.
    pub fn tick_at(&self, now: DateTime<Utc>) -> Result<TickReport> {
        let settings = &self.config.settings;
        let tz = parse_timezone(&settings.timezone)?;
        let tick_config = TickConfig {
            nodes: settings.nodes.iter().map(|node| node.id.clone()).collect(),
            reaggregate_hours: settings.reaggregate_hours,
            fetch_timeout: settings.fetch_timeout(),
        };
        let source = SpoolSource::new(self.config.spool_dir.clone());
        let orchestrator = Orchestrator::new(source, tz, tick_config);
        let db = open_db(&self.config)?;
        Ok(orchestrator.run_tick(&db, now))
    }
}
