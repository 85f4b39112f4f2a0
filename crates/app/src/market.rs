use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::warn;

const MARKET_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the coordinator's online marginal cost feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRow {
    #[serde(rename = "barra")]
    pub node: String,
    #[serde(rename = "fecha")]
    pub time: String,
    pub cmg: f64,
}

/// Online marginal cost per market node name for `hour` (`HH:MM:SS`) on
/// `date_to`. Any transport, status or decoding failure yields an empty map.
pub fn hourly_market_cost(
    base_url: &str,
    user_key: &str,
    date_from: NaiveDate,
    date_to: NaiveDate,
    nodes: &[String],
    hour: &str,
    timeout: Duration,
) -> BTreeMap<String, f64> {
    let client = match HttpClient::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(err) => {
            warn!(error = %err, "failed to build market client");
            return BTreeMap::new();
        }
    };
    let date_from = date_from.format("%Y-%m-%d").to_string();
    let date_to_param = date_to.format("%Y-%m-%d").to_string();
    let response = client
        .get(base_url)
        .query(&[
            ("fecha__gte", date_from.as_str()),
            ("fecha__lte", date_to_param.as_str()),
            ("user_key", user_key),
        ])
        .send();
    let rows = match response {
        Ok(resp) if resp.status().is_success() => match resp.json::<Vec<MarketRow>>() {
            Ok(rows) => rows,
            Err(err) => {
                warn!(error = %err, "market response was not the expected JSON");
                return BTreeMap::new();
            }
        },
        Ok(resp) => {
            warn!(status = %resp.status(), "market request rejected");
            return BTreeMap::new();
        }
        Err(err) => {
            warn!(error = %err, "market request failed");
            return BTreeMap::new();
        }
    };
    if rows.is_empty() {
        warn!("market response was empty");
    }
    select_hour(&rows, nodes, date_to, hour)
}

/// Values of `nodes` whose timestamp is exactly `date` at `hour`.
pub fn select_hour(
    rows: &[MarketRow],
    nodes: &[String],
    date: NaiveDate,
    hour: &str,
) -> BTreeMap<String, f64> {
    let wanted: HashSet<&str> = nodes.iter().map(String::as_str).collect();
    let Ok(cutoff) = NaiveDateTime::parse_from_str(
        &format!("{} {hour}", date.format("%Y-%m-%d")),
        MARKET_TIME_FORMAT,
    ) else {
        return BTreeMap::new();
    };
    rows.iter()
        .filter(|row| wanted.contains(row.node.as_str()))
        .filter(|row| {
            NaiveDateTime::parse_from_str(&row.time, MARKET_TIME_FORMAT)
                .is_ok_and(|time| time == cutoff)
        })
        .map(|row| (row.node.clone(), row.cmg))
        .collect()
}
