use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use cmg_core::{LastKnownReading, ResolvedReading, SourceKind};
use tracing::{debug, warn};

use crate::source::{DocumentInfo, DocumentSource, FetchedDocument, SourceError};
use crate::timeout::call_with_timeout;
use crate::types::{IngestError, Result};

/// Turns a node and target hour into a reading, either corrected from the
/// day's bulletin or carried forward from the node's last stored sample.
pub struct Resolver<S> {
    source: Arc<S>,
    timeout: Duration,
}

impl<S: DocumentSource> Resolver<S> {
    pub fn new(source: S, timeout: Duration) -> Self {
        Self {
            source: Arc::new(source),
            timeout,
        }
    }

    /// Fetches and parses the index document for `day`. `Ok(None)` means the
    /// source has nothing published for that day.
    pub fn probe(&self, day: NaiveDate) -> Result<Option<DocumentInfo>> {
        let source = Arc::clone(&self.source);
        let fetched = call_with_timeout(self.timeout, "fetch_document", move || {
            source.fetch_document(day)
        })?;
        let document = match fetched {
            FetchedDocument::Available(document) => document,
            FetchedDocument::NotAvailable => {
                debug!(%day, "index document not available");
                return Ok(None);
            }
        };
        let source = Arc::clone(&self.source);
        let info = call_with_timeout(self.timeout, "parse_document", move || {
            source.parse_document(&document)
        })?;
        Ok(Some(info))
    }

    /// Resolves the reading for `node` at local hour-of-day `hour`.
    ///
    /// `bulletin` is the result of [`Resolver::probe`] for the tick. Without a
    /// bulletin for today the last known reading is repeated; once a bulletin
    /// is available, any failure to use it is returned as an error.
    pub fn resolve(
        &self,
        node: &str,
        hour: u32,
        last_known: Option<&LastKnownReading>,
        bulletin: Option<&DocumentInfo>,
    ) -> Result<ResolvedReading> {
        let decoupled = last_known.is_some_and(|reading| reading.decoupled);
        let bulletin = bulletin.filter(|info| info.available_today);
        let Some(bulletin) = bulletin else {
            let previous =
                last_known.ok_or_else(|| IngestError::NoPriorReading(node.to_string()))?;
            return Ok(ResolvedReading {
                cmg: previous.cmg,
                reference_node: previous.reference_node.clone(),
                decoupled: previous.decoupled,
                source: SourceKind::Fallback,
            });
        };

        let identifier = bulletin.identifier.clone().ok_or_else(|| {
            IngestError::from(SourceError::DataQuality(
                "bulletin is available but has no identifier".to_string(),
            ))
        })?;
        let source = Arc::clone(&self.source);
        let tables = call_with_timeout(self.timeout, "fetch_and_parse_tables", move || {
            source.fetch_and_parse_tables(&identifier)
        })?;
        let temp_files = tables.temp_files.clone();

        let hint = last_known
            .map(|reading| reading.reference_node.clone())
            .unwrap_or_else(|| node.to_string());
        let source = Arc::clone(&self.source);
        let target = node.to_string();
        let computed = call_with_timeout(self.timeout, "compute_corrected_cost", move || {
            source.compute_corrected_cost(
                hour,
                &tables.tco,
                &tables.fp,
                &tables.rio,
                &hint,
                &target,
            )
        });
        self.cleanup(node, temp_files);

        let (cmg, reference_node) = computed?;
        Ok(ResolvedReading {
            cmg,
            reference_node,
            decoupled,
            source: SourceKind::Corrected,
        })
    }

    fn cleanup(&self, node: &str, temp_files: Vec<String>) {
        for name in temp_files {
            let source = Arc::clone(&self.source);
            let target = name.clone();
            if let Err(err) = call_with_timeout(self.timeout, "delete_temp_file", move || {
                source.delete_temp_file(&target)
            }) {
                warn!(node, file = %name, error = %err, "failed to delete temp file");
            }
        }
    }
}
