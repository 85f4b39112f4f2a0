mod ingest;
mod market;
mod parameters;
mod readings;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::error::{AppError, Result};
use cmg_db::Db;

pub use ingest::IngestService;
pub use market::{MarketService, MarketSnapshot};
pub use parameters::ParametersService;
pub use readings::ReadingsService;

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub readings: ReadingsService,
    pub parameters: ParametersService,
    pub ingest: IngestService,
    pub market: MarketService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            readings: ReadingsService::new(shared.clone()),
            parameters: ParametersService::new(shared.clone()),
            ingest: IngestService::new(shared.clone()),
            market: MarketService::new(shared),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}

fn require_node(config: &SharedConfig, node: &str) -> Result<()> {
    if node.trim().is_empty() {
        return Err(AppError::InvalidInput("node is required".to_string()));
    }
    if config.settings.node(node).is_none() {
        return Err(AppError::NotFound(format!("node {node} is not monitored")));
    }
    Ok(())
}
