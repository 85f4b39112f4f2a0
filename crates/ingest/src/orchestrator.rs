use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use cmg_core::{
    HourParts, LastKnownReading, NewCheckpoint, RawSample, ResolvedReading, SourceKind, decompose,
    human_timestamp, round_down_to_hour,
};
use cmg_db::{Db, SampleTable};
use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::aggregate::refresh_window;
use crate::oracle::exists;
use crate::resolver::Resolver;
use crate::source::{DocumentInfo, DocumentSource};
use crate::types::{IngestError, NodeOutcome, NodeReport, TickConfig, TickReport, TickStage};

struct PendingNode {
    index: usize,
    node: String,
    last_known: Option<LastKnownReading>,
}

/// Drives one ingestion tick across all monitored nodes.
pub struct Orchestrator<S> {
    resolver: Resolver<S>,
    tz: Tz,
    config: TickConfig,
}

impl<S: DocumentSource> Orchestrator<S> {
    pub fn new(source: S, tz: Tz, config: TickConfig) -> Self {
        Self {
            resolver: Resolver::new(source, config.fetch_timeout),
            tz,
            config,
        }
    }

    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    /// Runs the tick for the hour containing `now`.
    ///
    /// Store access stays on the calling thread; only resolution fans out.
    /// Node failures are reported, never propagated, and exactly one
    /// checkpoint is appended whatever the node outcomes were.
    pub fn run_tick(&self, db: &Db, now: DateTime<Utc>) -> TickReport {
        let local = now.with_timezone(&self.tz);
        let hour = round_down_to_hour(&local);
        let parts = decompose(&hour);
        let hour_epoch = parts.unix_time;

        let mut outcomes: Vec<Option<NodeOutcome>> = vec![None; self.config.nodes.len()];
        let mut pending = Vec::new();
        for (index, node) in self.config.nodes.iter().enumerate() {
            if exists(db, node, hour_epoch, SampleTable::RawSample) {
                info!(
                    node = node.as_str(),
                    hour_epoch, "raw sample already recorded, skipping"
                );
                outcomes[index] = Some(NodeOutcome::Skipped);
                continue;
            }
            match db.last_known_reading(node) {
                Ok(last_known) => pending.push(PendingNode {
                    index,
                    node: node.clone(),
                    last_known,
                }),
                Err(err) => {
                    let err = IngestError::from(err);
                    log_failure(node, hour_epoch, TickStage::Lookup, None, &err);
                    outcomes[index] = Some(failed(TickStage::Lookup, &err));
                }
            }
        }

        let bulletin = self.resolver.probe(hour.date_naive());
        if let Err(err) = &bulletin {
            warn!(hour_epoch, error = %err, "bulletin probe failed");
        }

        let resolved: Vec<(PendingNode, Result<ResolvedReading, String>)> = match &bulletin {
            Ok(info) => pending
                .into_par_iter()
                .map(|node| {
                    let attempted = attempted_source(info.as_ref());
                    let result = self
                        .resolver
                        .resolve(
                            &node.node,
                            hour.hour(),
                            node.last_known.as_ref(),
                            info.as_ref(),
                        )
                        .map_err(|err| {
                            let stage = TickStage::Resolve;
                            log_failure(&node.node, hour_epoch, stage, Some(attempted), &err);
                            err.to_string()
                        });
                    (node, result)
                })
                .collect(),
            Err(err) => pending
                .into_iter()
                .map(|node| {
                    let attempted = Some(SourceKind::Corrected);
                    log_failure(&node.node, hour_epoch, TickStage::Resolve, attempted, err);
                    (node, Err(err.to_string()))
                })
                .collect(),
        };

        for (node, result) in resolved {
            let outcome = match result {
                Ok(reading) => self.persist(db, &node.node, &parts, &hour, &reading),
                Err(error) => NodeOutcome::Failed {
                    stage: TickStage::Resolve,
                    error,
                },
            };
            outcomes[node.index] = Some(outcome);
        }

        let nodes = self
            .config
            .nodes
            .iter()
            .zip(outcomes)
            .map(|(node, outcome)| NodeReport {
                node: node.clone(),
                outcome: outcome.unwrap_or(NodeOutcome::Skipped),
            })
            .collect();

        let info = bulletin.ok().flatten();
        let (checkpoint_id, document, document_changed) =
            self.append_checkpoint(db, &local, info.as_ref());

        TickReport {
            hour_epoch,
            hour: human_timestamp(&hour),
            nodes,
            checkpoint_id,
            document,
            document_changed,
        }
    }

    fn persist(
        &self,
        db: &Db,
        node: &str,
        parts: &HourParts,
        hour: &DateTime<Tz>,
        reading: &ResolvedReading,
    ) -> NodeOutcome {
        let sample = RawSample::from_reading(node, parts, reading);
        match db.insert_raw_sample(&sample) {
            Ok(Some(_)) => {}
            Ok(None) => {
                info!(
                    node,
                    hour_epoch = parts.unix_time,
                    "raw sample recorded by a concurrent tick, skipping"
                );
                return NodeOutcome::Skipped;
            }
            Err(err) => {
                let err = IngestError::from(err);
                let source = Some(reading.source);
                log_failure(node, parts.unix_time, TickStage::Insert, source, &err);
                return failed(TickStage::Insert, &err);
            }
        }

        let refresh = refresh_window(db, node, hour, self.config.reaggregate_hours);
        if let Some(err) = refresh.failure_at(parts.unix_time) {
            let source = Some(reading.source);
            log_failure(node, parts.unix_time, TickStage::Aggregate, source, err);
            return failed(TickStage::Aggregate, err);
        }
        info!(
            node,
            hour_epoch = parts.unix_time,
            source = reading.source.as_str(),
            cmg = reading.cmg,
            aggregates_written = refresh.written,
            aggregates_failed = refresh.failures.len(),
            "raw sample recorded"
        );
        NodeOutcome::Inserted {
            source: reading.source,
            cmg: reading.cmg,
            aggregates_written: refresh.written,
        }
    }

    fn append_checkpoint(
        &self,
        db: &Db,
        local: &DateTime<Tz>,
        info: Option<&DocumentInfo>,
    ) -> (Option<i64>, Option<String>, bool) {
        let document = info.and_then(|info| info.identifier.clone());
        let last_modification = info.and_then(|info| info.last_modified.clone());
        let document_changed = db
            .document_changed_since_last(last_modification.as_deref())
            .unwrap_or_else(|err| {
                warn!(error = %err, "document change lookup failed");
                false
            });
        let checkpoint = NewCheckpoint {
            timestamp: human_timestamp(local),
            unix_time: local.timestamp(),
            document: document.clone(),
            last_modification,
            document_changed,
        };
        let checkpoint_id = match db.insert_checkpoint(&checkpoint) {
            Ok(id) => Some(id),
            Err(err) => {
                error!(error = %err, "failed to append tracking checkpoint");
                None
            }
        };
        (checkpoint_id, document, document_changed)
    }
}

fn attempted_source(info: Option<&DocumentInfo>) -> SourceKind {
    match info {
        Some(info) if info.available_today => SourceKind::Corrected,
        _ => SourceKind::Fallback,
    }
}

fn failed(stage: TickStage, err: &IngestError) -> NodeOutcome {
    NodeOutcome::Failed {
        stage,
        error: err.to_string(),
    }
}

fn log_failure(
    node: &str,
    hour_epoch: i64,
    stage: TickStage,
    source: Option<SourceKind>,
    err: &IngestError,
) {
    error!(
        node,
        hour_epoch,
        ?stage,
        source = source.map(|kind| kind.as_str()),
        error = %err,
        "node aborted for this tick"
    );
}
