use std::path::PathBuf;

use chrono_tz::Tz;

use crate::config::MonitorSettings;
use crate::error::{AppError, Result};
use crate::services::AppServices;
use crate::startup::AppPaths;
use crate::util::time::parse_timezone;
use cmg_db::Db;

/// Paths and settings needed to run the monitor.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub spool_dir: PathBuf,
    pub settings: MonitorSettings,
}

impl AppConfig {
    pub fn timezone(&self) -> Result<Tz> {
        parse_timezone(&self.settings.timezone)
    }
}

/// Application state shared by frontends (HTTP API, CLI).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(paths: &AppPaths, settings: MonitorSettings) -> Self {
        let config = AppConfig {
            db_path: paths.db_path.clone(),
            spool_dir: paths.spool_dir.clone(),
            settings,
        };
        let services = AppServices::new(&config);
        Self { config, services }
    }

    pub fn is_fresh_db(&self) -> bool {
        !self.config.db_path.exists()
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }

    /// Validates settings and prepares the database.
    pub fn initialize(&self) -> Result<()> {
        self.config.timezone()?;
        if self.config.settings.nodes.is_empty() {
            return Err(AppError::InvalidInput(
                "at least one node must be monitored".to_string(),
            ));
        }
        self.setup_db()
            .map_err(|err| AppError::Message(format!("initialize db: {}", err)))?;
        Ok(())
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }
}

pub fn setup_db(path: &std::path::Path) -> Result<()> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
