#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use cmg_core::RawSample;
use cmg_db::Db;
use cmg_ingest::{
    BulletinTables, Document, DocumentInfo, DocumentSource, FetchedDocument, SourceError,
    TickConfig,
};
use tempfile::TempDir;

pub const HOUR: i64 = 1_792_166_400;
pub const CHARRUA: &str = "CHARRUA__220";
pub const QUILLOTA: &str = "QUILLOTA__220";

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("ingest.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb { _dir: dir, db, path }
}

pub fn at(unix_time: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(unix_time, 0).single().expect("valid time")
}

pub fn config(timeout: Duration) -> TickConfig {
    TickConfig {
        nodes: vec![CHARRUA.to_string(), QUILLOTA.to_string()],
        reaggregate_hours: 2,
        fetch_timeout: timeout,
    }
}

pub fn seed_sample(
    db: &Db,
    node: &str,
    unix_time: i64,
    cmg: f64,
    reference: &str,
    decoupled: bool,
) {
    db.insert_raw_sample(&RawSample {
        node: node.to_string(),
        year: 2026,
        month: 10,
        day: 16,
        hour: "12:00:00".to_string(),
        unix_time,
        decoupled,
        cmg,
        reference_node: reference.to_string(),
    })
    .expect("seed sample");
}

#[derive(Debug, Clone)]
pub struct CannedBulletin {
    pub identifier: String,
    pub last_modified: String,
    pub published_today: bool,
}

/// In-memory bulletin source. Nodes missing from `costs` fail with a data
/// quality error; nodes in `slow_nodes` hang past any reasonable timeout.
#[derive(Debug, Clone, Default)]
pub struct CannedSource {
    pub bulletin: Option<CannedBulletin>,
    pub costs: HashMap<String, f64>,
    pub slow_nodes: Vec<String>,
    pub deleted: Arc<Mutex<Vec<String>>>,
}

impl CannedSource {
    pub fn not_available() -> Self {
        Self::default()
    }

    pub fn published(last_modified: &str, costs: &[(&str, f64)]) -> Self {
        Self {
            bulletin: Some(CannedBulletin {
                identifier: "RIO261016".to_string(),
                last_modified: last_modified.to_string(),
                published_today: true,
            }),
            costs: costs
                .iter()
                .map(|(node, cost)| (node.to_string(), *cost))
                .collect(),
            ..Self::default()
        }
    }

    pub fn deleted_files(&self) -> Vec<String> {
        self.deleted.lock().expect("deleted lock").clone()
    }
}

impl DocumentSource for CannedSource {
    type Table = HashMap<String, f64>;

    fn fetch_document(&self, day: NaiveDate) -> Result<FetchedDocument, SourceError> {
        Ok(match &self.bulletin {
            Some(_) => FetchedDocument::Available(Document {
                day,
                body: String::new(),
            }),
            None => FetchedDocument::NotAvailable,
        })
    }

    fn parse_document(&self, _document: &Document) -> Result<DocumentInfo, SourceError> {
        let bulletin = self
            .bulletin
            .as_ref()
            .ok_or_else(|| SourceError::DataQuality("no bulletin".to_string()))?;
        Ok(DocumentInfo {
            available_today: bulletin.published_today,
            identifier: Some(bulletin.identifier.clone()),
            last_modified: Some(bulletin.last_modified.clone()),
        })
    }

    fn fetch_and_parse_tables(
        &self,
        identifier: &str,
    ) -> Result<BulletinTables<Self::Table>, SourceError> {
        Ok(BulletinTables {
            rio: HashMap::new(),
            tco: self.costs.clone(),
            fp: HashMap::new(),
            temp_files: vec![format!("{identifier}.tmp")],
        })
    }

    fn compute_corrected_cost(
        &self,
        _hour: u32,
        tco: &Self::Table,
        _fp: &Self::Table,
        _rio: &Self::Table,
        _reference_hint: &str,
        node: &str,
    ) -> Result<(f64, String), SourceError> {
        if self.slow_nodes.iter().any(|slow| slow == node) {
            thread::sleep(Duration::from_secs(5));
        }
        tco.get(node)
            .map(|cost| (*cost, format!("REF_{node}")))
            .ok_or_else(|| SourceError::DataQuality(format!("no TCO row for {node}")))
    }

    fn delete_temp_file(&self, name: &str) -> Result<(), SourceError> {
        self.deleted
            .lock()
            .expect("deleted lock")
            .push(name.to_string());
        Ok(())
    }
}
