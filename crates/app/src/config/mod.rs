use std::path::PathBuf;
use std::time::Duration;

use cmg_core::{MonitoredNode, default_nodes};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides [`MarketSettings::user_key`].
pub const MARKET_USER_KEY_ENV: &str = "CMG_MARKET_USER_KEY";

const DEFAULT_MARKET_URL: &str = "https://www.coordinador.cl/wp-json/costo-marginal/v1/data/";

/// Monitoring settings shared by every frontend.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub timezone: String,
    pub fetch_timeout_secs: u64,
    pub reaggregate_hours: u32,
    pub display_hours: u32,
    pub spool_dir: Option<PathBuf>,
    pub nodes: Vec<MonitoredNode>,
    pub market: MarketSettings,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            timezone: "America/Santiago".to_string(),
            fetch_timeout_secs: 30,
            reaggregate_hours: 2,
            display_hours: 96,
            spool_dir: None,
            nodes: default_nodes(),
            market: MarketSettings::default(),
        }
    }
}

impl MonitorSettings {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    pub fn node(&self, id: &str) -> Option<&MonitoredNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketSettings {
    pub base_url: String,
    pub user_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MARKET_URL.to_string(),
            user_key: None,
            timeout_secs: 15,
        }
    }
}

impl MarketSettings {
    pub fn resolved_user_key(&self) -> Option<String> {
        std::env::var(MARKET_USER_KEY_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.user_key.clone())
    }
}
