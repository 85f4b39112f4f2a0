use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::market::hourly_market_cost;
use crate::services::SharedConfig;
use crate::util::time::{current_hour, parse_timezone};

/// Online costs for the current hour, keyed by monitored node id.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub hour: String,
    pub values: BTreeMap<String, f64>,
}

#[derive(Clone)]
pub struct MarketService {
    config: SharedConfig,
}

impl MarketService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Blocking; call from a blocking context.
    pub fn online(&self) -> Result<MarketSnapshot> {
        let settings = &self.config.settings;
        let tz = parse_timezone(&settings.timezone)?;
        let hour = current_hour(tz, Utc::now());
        let hour_label = hour.format("%H:%M:%S").to_string();
        let Some(user_key) = settings.market.resolved_user_key() else {
            warn!("market user key is not configured");
            return Ok(MarketSnapshot {
                hour: hour_label,
                values: BTreeMap::new(),
            });
        };
        let market_names: Vec<String> = settings
            .nodes
            .iter()
            .map(|node| node.market_name.clone())
            .collect();
        let today = hour.date_naive();
        let by_market_name = hourly_market_cost(
            &settings.market.base_url,
            &user_key,
            today,
            today,
            &market_names,
            &hour_label,
            Duration::from_secs(settings.market.timeout_secs.max(1)),
        );
        let values = settings
            .nodes
            .iter()
            .filter_map(|node| {
                by_market_name
                    .get(&node.market_name)
                    .map(|value| (node.id.clone(), *value))
            })
            .collect();
        Ok(MarketSnapshot {
            hour: hour_label,
            values,
        })
    }
}
