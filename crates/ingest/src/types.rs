use std::time::Duration;

use cmg_core::{AggregateError, SourceKind};
use cmg_db::DbError;
use serde::Serialize;

use crate::source::SourceError;

/// Errors that abort a single node's sub-flow within a tick.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("transient fetch failure: {0}")]
    TransientFetch(SourceError),
    #[error("data quality problem: {0}")]
    DataQuality(SourceError),
    #[error("node {0} has no prior reading and no bulletin is available")]
    NoPriorReading(String),
    #[error("aggregation error: {0}")]
    Aggregate(#[from] AggregateError),
    #[error("store error: {0}")]
    Store(#[from] DbError),
}

impl From<SourceError> for IngestError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::DataQuality(_) => Self::DataQuality(err),
            SourceError::Transient(_) | SourceError::Timeout { .. } => Self::TransientFetch(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Per-tick settings for the orchestrator.
#[derive(Debug, Clone)]
pub struct TickConfig {
    pub nodes: Vec<String>,
    /// Hours recomputed after a new raw sample, ending at the current hour.
    pub reaggregate_hours: u32,
    pub fetch_timeout: Duration,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            nodes: cmg_core::default_nodes()
                .into_iter()
                .map(|node| node.id)
                .collect(),
            reaggregate_hours: 2,
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TickStage {
    Lookup,
    Resolve,
    Insert,
    Aggregate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NodeOutcome {
    /// A raw sample for the hour already existed.
    Skipped,
    Inserted {
        source: SourceKind,
        cmg: f64,
        aggregates_written: usize,
    },
    Failed {
        stage: TickStage,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeReport {
    pub node: String,
    pub outcome: NodeOutcome,
}

/// Summary of one orchestrator tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub hour_epoch: i64,
    pub hour: String,
    pub nodes: Vec<NodeReport>,
    pub checkpoint_id: Option<i64>,
    pub document: Option<String>,
    pub document_changed: bool,
}

impl TickReport {
    pub fn failed_nodes(&self) -> usize {
        self.nodes
            .iter()
            .filter(|report| matches!(report.outcome, NodeOutcome::Failed { .. }))
            .count()
    }
}
