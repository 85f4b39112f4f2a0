mod aggregate;
mod clock;

use serde::{Deserialize, Serialize};

pub use aggregate::{AggregateError, CostPoint, weighted_hourly_average};
pub use clock::{HourParts, decompose, human_timestamp, round_down_to_hour};

/// Length of one aggregation window.
pub const HOUR_SECONDS: i64 = 3600;

/// Format used for the human readable timestamps stored next to epoch columns.
pub const HUMAN_TIMESTAMP_FORMAT: &str = "%d.%m.%y %H:%M:%S";

/// One observed or derived cost reading for a node. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub node: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: String,
    pub unix_time: i64,
    pub decoupled: bool,
    pub cmg: f64,
    pub reference_node: String,
}

impl RawSample {
    pub fn from_reading(node: &str, parts: &HourParts, reading: &ResolvedReading) -> Self {
        Self {
            node: node.to_string(),
            year: parts.year,
            month: parts.month,
            day: parts.day,
            hour: parts.hour.clone(),
            unix_time: parts.unix_time,
            decoupled: reading.decoupled,
            cmg: reading.cmg,
            reference_node: reading.reference_node.clone(),
        }
    }
}

/// Duration-weighted average cost of a node over one hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyAggregate {
    pub node: String,
    pub timestamp: String,
    pub unix_time: i64,
    pub cmg_weighted: f64,
}

/// Record of one completed ingestion tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingCheckpoint {
    pub id: i64,
    pub timestamp: String,
    pub unix_time: i64,
    pub document: Option<String>,
    pub last_modification: Option<String>,
    pub document_changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCheckpoint {
    pub timestamp: String,
    pub unix_time: i64,
    pub document: Option<String>,
    pub last_modification: Option<String>,
    pub document_changed: bool,
}

/// Values carried forward from the most recent raw sample of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastKnownReading {
    pub reference_node: String,
    pub decoupled: bool,
    pub cmg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Corrected,
    Fallback,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Corrected => "corrected",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedReading {
    pub cmg: f64,
    pub reference_node: String,
    pub decoupled: bool,
    pub source: SourceKind,
}

/// Operator-maintained cost parameters for a generating plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub id: Option<i64>,
    pub plant: String,
    pub generating: bool,
    pub provider_rate: f64,
    pub brent_percentage: f64,
    pub plant_rate: f64,
    pub brent_price: f64,
    pub brent_reference_date: String,
    pub operational_cost: f64,
    pub guarantee_margin: f64,
    pub engine_factor: f64,
    pub editor: String,
    pub external_update: bool,
    pub registered_at: String,
}

impl ParameterSnapshot {
    /// Operational cost without the guarantee margin.
    pub fn base_operational_cost(&self) -> f64 {
        self.operational_cost - self.guarantee_margin
    }
}

/// A transmission bus under monitoring and the plant that sells into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredNode {
    pub id: String,
    pub plant: String,
    pub market_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub node: String,
    pub plant: String,
    pub last_reading: Option<LastKnownReading>,
    pub latest_weighted: Option<HourlyAggregate>,
    pub generating: Option<bool>,
    pub operational_cost: Option<f64>,
    pub base_operational_cost: Option<f64>,
}

impl NodeStatus {
    pub fn decoupling_label(&self) -> &'static str {
        match self.last_reading.as_ref() {
            Some(reading) if reading.decoupled => "Activo",
            _ => "No Activo",
        }
    }
}

pub fn default_nodes() -> Vec<MonitoredNode> {
    vec![
        MonitoredNode {
            id: "CHARRUA__220".to_string(),
            plant: "Los Angeles".to_string(),
            market_name: "Charrua".to_string(),
        },
        MonitoredNode {
            id: "QUILLOTA__220".to_string(),
            plant: "Quillota".to_string(),
            market_name: "Quillota".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_sample_copies_reading_and_hour_fields() {
        let parts = HourParts {
            year: 2026,
            month: 10,
            day: 16,
            hour: "14:00:00".to_string(),
            unix_time: 1_792_170_000,
        };
        let reading = ResolvedReading {
            cmg: 61.25,
            reference_node: "SANTA_MARIA".to_string(),
            decoupled: true,
            source: SourceKind::Corrected,
        };
        let sample = RawSample::from_reading("CHARRUA__220", &parts, &reading);
        assert_eq!(sample.node, "CHARRUA__220");
        assert_eq!(sample.hour, "14:00:00");
        assert_eq!(sample.unix_time, 1_792_170_000);
        assert!(sample.decoupled);
        assert_eq!(sample.reference_node, "SANTA_MARIA");
    }

    #[test]
    fn node_status_labels_decoupling() {
        let mut status = NodeStatus {
            node: "QUILLOTA__220".to_string(),
            plant: "Quillota".to_string(),
            last_reading: None,
            latest_weighted: None,
            generating: None,
            operational_cost: None,
            base_operational_cost: None,
        };
        assert_eq!(status.decoupling_label(), "No Activo");
        status.last_reading = Some(LastKnownReading {
            reference_node: "QUILLOTA__220".to_string(),
            decoupled: true,
            cmg: 10.0,
        });
        assert_eq!(status.decoupling_label(), "Activo");
    }
}
