use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::source::{
    BulletinTables, Document, DocumentInfo, DocumentSource, FetchedDocument, SourceError,
};

const MANIFEST_FILE: &str = "bulletin.json";
const TABLES_DIR: &str = "tables";
const STAGING_DIR: &str = ".staging";

/// One row of a bulletin table as written by the screener.
///
/// RIO rows name the marginal unit (`reference`) for a node (`key`) and hour,
/// TCO rows carry the operational cost (`value`) of a unit, FP rows carry the
/// penalty factor of a node for an hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub hour: Option<u32>,
    pub key: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BulletinManifest {
    identifier: String,
    published_for: NaiveDate,
    last_modified: String,
}

#[derive(Debug, Deserialize)]
struct TableFile {
    rio: Vec<TableRow>,
    tco: Vec<TableRow>,
    fp: Vec<TableRow>,
}

/// [`DocumentSource`] over a drop folder filled by the external screener.
///
/// Layout under `root`:
/// - `<YYYY-MM-DD>/bulletin.json`: `{identifier, published_for, last_modified}`
/// - `tables/<identifier>.json`: `{rio, tco, fp}` arrays of [`TableRow`]
#[derive(Debug, Clone)]
pub struct SpoolSource {
    root: PathBuf,
    staging: PathBuf,
    staged: Arc<AtomicU64>,
}

impl SpoolSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let staging = root.join(STAGING_DIR);
        Self {
            root,
            staging,
            staged: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn manifest_path(&self, day: NaiveDate) -> PathBuf {
        self.root
            .join(day.format("%Y-%m-%d").to_string())
            .join(MANIFEST_FILE)
    }
}

fn check_identifier(identifier: &str) -> Result<(), SourceError> {
    let invalid = identifier.is_empty()
        || identifier.contains(['/', '\\'])
        || identifier.starts_with('.');
    if invalid {
        return Err(SourceError::DataQuality(format!(
            "invalid bulletin identifier {identifier:?}"
        )));
    }
    Ok(())
}

// Rows without an hour apply to the whole day.
fn find_row<'a>(rows: &'a [TableRow], key: &str, hour: u32) -> Option<&'a TableRow> {
    rows.iter()
        .find(|row| row.key == key && row.hour.is_none_or(|row_hour| row_hour == hour))
}

impl DocumentSource for SpoolSource {
    type Table = Vec<TableRow>;

    fn fetch_document(&self, day: NaiveDate) -> Result<FetchedDocument, SourceError> {
        let path = self.manifest_path(day);
        match fs::read_to_string(&path) {
            Ok(body) => Ok(FetchedDocument::Available(Document { day, body })),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(FetchedDocument::NotAvailable),
            Err(err) => Err(SourceError::Transient(format!(
                "failed to read {}: {err}",
                path.display()
            ))),
        }
    }

    fn parse_document(&self, document: &Document) -> Result<DocumentInfo, SourceError> {
        let manifest: BulletinManifest = serde_json::from_str(&document.body).map_err(|err| {
            SourceError::DataQuality(format!("unreadable bulletin manifest: {err}"))
        })?;
        Ok(DocumentInfo {
            available_today: manifest.published_for == document.day,
            identifier: Some(manifest.identifier),
            last_modified: Some(manifest.last_modified),
        })
    }

    fn fetch_and_parse_tables(
        &self,
        identifier: &str,
    ) -> Result<BulletinTables<Self::Table>, SourceError> {
        check_identifier(identifier)?;
        let source = self.root.join(TABLES_DIR).join(format!("{identifier}.json"));
        if !source.is_file() {
            return Err(SourceError::DataQuality(format!(
                "tables for bulletin {identifier} are missing"
            )));
        }
        fs::create_dir_all(&self.staging).map_err(|err| {
            SourceError::Transient(format!("failed to create {}: {err}", self.staging.display()))
        })?;
        // Nodes resolve in parallel, so every call gets its own staged copy.
        let sequence = self.staged.fetch_add(1, Ordering::Relaxed);
        let staged = self
            .staging
            .join(format!("{identifier}.{}.{sequence}.json", std::process::id()));
        fs::copy(&source, &staged).map_err(|err| {
            SourceError::Transient(format!("failed to stage {}: {err}", source.display()))
        })?;

        let parsed = fs::read_to_string(&staged)
            .map_err(|err| SourceError::Transient(format!("failed to read staged tables: {err}")))
            .and_then(|body| {
                serde_json::from_str::<TableFile>(&body).map_err(|err| {
                    SourceError::DataQuality(format!("unparseable tables for {identifier}: {err}"))
                })
            });
        let tables = match parsed {
            Ok(tables) => tables,
            Err(err) => {
                if let Err(remove_err) = fs::remove_file(&staged) {
                    warn!(
                        file = %staged.display(),
                        error = %remove_err,
                        "failed to remove staged tables"
                    );
                }
                return Err(err);
            }
        };
        debug!(
            identifier,
            rio = tables.rio.len(),
            tco = tables.tco.len(),
            fp = tables.fp.len(),
            "bulletin tables staged"
        );
        Ok(BulletinTables {
            rio: tables.rio,
            tco: tables.tco,
            fp: tables.fp,
            temp_files: vec![staged.to_string_lossy().to_string()],
        })
    }

    fn compute_corrected_cost(
        &self,
        hour: u32,
        tco: &Self::Table,
        fp: &Self::Table,
        rio: &Self::Table,
        reference_hint: &str,
        node: &str,
    ) -> Result<(f64, String), SourceError> {
        let reference = find_row(rio, node, hour)
            .and_then(|row| row.reference.clone())
            .filter(|reference| !reference.trim().is_empty())
            .unwrap_or_else(|| reference_hint.to_string());
        let cost = find_row(tco, &reference, hour)
            .and_then(|row| row.value)
            .ok_or_else(|| {
                SourceError::DataQuality(format!("TCO has no cost for unit {reference}"))
            })?;
        let factor = fp
            .iter()
            .find(|row| row.key == node && row.hour == Some(hour))
            .and_then(|row| row.value)
            .ok_or_else(|| {
                SourceError::DataQuality(format!("FP has no factor for {node} at hour {hour}"))
            })?;
        Ok((cost * factor, reference))
    }

    fn delete_temp_file(&self, name: &str) -> Result<(), SourceError> {
        let path = Path::new(name);
        if !path.starts_with(&self.staging) {
            return Err(SourceError::DataQuality(format!(
                "{name} is not a staged file"
            )));
        }
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SourceError::Transient(format!("failed to delete {name}: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(hour: Option<u32>, key: &str, value: Option<f64>, reference: Option<&str>) -> TableRow {
        TableRow {
            hour,
            key: key.to_string(),
            value,
            reference: reference.map(str::to_string),
        }
    }

    #[test]
    fn rejects_identifiers_that_escape_the_folder() {
        assert!(check_identifier("RIO261016").is_ok());
        assert!(check_identifier("../etc").is_err());
        assert!(check_identifier("a/b").is_err());
        assert!(check_identifier("").is_err());
    }

    #[test]
    fn manifest_dates_decide_whether_the_bulletin_is_for_today() {
        let source = SpoolSource::new("/tmp/unused");
        let day = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");
        let body = r#"{
            "identifier": "RIO261016",
            "published_for": "2026-10-16",
            "last_modified": "16.10.26 10:02:35"
        }"#;

        let today = source
            .parse_document(&Document {
                day,
                body: body.to_string(),
            })
            .expect("manifest");
        assert!(today.available_today);
        assert_eq!(today.identifier.as_deref(), Some("RIO261016"));
        assert_eq!(today.last_modified.as_deref(), Some("16.10.26 10:02:35"));

        let next_day = day.succ_opt().expect("date");
        let stale = source
            .parse_document(&Document {
                day: next_day,
                body: body.to_string(),
            })
            .expect("manifest");
        assert!(!stale.available_today);

        let garbled = source.parse_document(&Document {
            day,
            body: r#"{"identifier": "RIO261016", "published_for": "16/10/2026"}"#.to_string(),
        });
        assert!(matches!(garbled, Err(SourceError::DataQuality(_))));
    }

    #[test]
    fn corrected_cost_uses_marginal_unit_and_penalty_factor() {
        let source = SpoolSource::new("/tmp/unused");
        let rio = vec![
            row(Some(14), "CHARRUA__220", None, Some("SANTA_MARIA")),
            row(Some(15), "CHARRUA__220", None, Some("NEHUENCO")),
        ];
        let tco = vec![
            row(None, "SANTA_MARIA", Some(50.0), None),
            row(None, "NEHUENCO", Some(80.0), None),
        ];
        let fp = vec![
            row(Some(14), "CHARRUA__220", Some(1.1), None),
            row(Some(15), "CHARRUA__220", Some(1.2), None),
        ];
        let (cost, reference) = source
            .compute_corrected_cost(14, &tco, &fp, &rio, "CHARRUA__220", "CHARRUA__220")
            .expect("cost");
        assert_eq!(reference, "SANTA_MARIA");
        assert!((cost - 55.0).abs() < 1e-9);
    }

    #[test]
    fn corrected_cost_falls_back_to_reference_hint() {
        let source = SpoolSource::new("/tmp/unused");
        let tco = vec![row(None, "NEHUENCO", Some(80.0), None)];
        let fp = vec![row(Some(3), "QUILLOTA__220", Some(0.5), None)];
        let (cost, reference) = source
            .compute_corrected_cost(3, &tco, &fp, &Vec::new(), "NEHUENCO", "QUILLOTA__220")
            .expect("cost");
        assert_eq!(reference, "NEHUENCO");
        assert!((cost - 40.0).abs() < 1e-9);
    }

    #[test]
    fn missing_factor_is_a_data_quality_error() {
        let source = SpoolSource::new("/tmp/unused");
        let tco = vec![row(None, "NEHUENCO", Some(80.0), None)];
        let err = source
            .compute_corrected_cost(3, &tco, &Vec::new(), &Vec::new(), "NEHUENCO", "QUILLOTA__220")
            .expect_err("no factor");
        assert!(matches!(err, SourceError::DataQuality(_)));
    }
}
