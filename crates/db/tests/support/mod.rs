#![allow(dead_code)]

use std::path::PathBuf;

use cmg_core::{NewCheckpoint, ParameterSnapshot, RawSample};
use cmg_db::Db;
use tempfile::TempDir;

pub const HOUR: i64 = 1_792_166_400;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn make_sample(node: &str, unix_time: i64, cmg: f64, reference_node: &str) -> RawSample {
    RawSample {
        node: node.to_string(),
        year: 2026,
        month: 10,
        day: 16,
        hour: "14:00:00".to_string(),
        unix_time,
        decoupled: false,
        cmg,
        reference_node: reference_node.to_string(),
    }
}

pub fn make_checkpoint(last_modification: Option<&str>, document_changed: bool) -> NewCheckpoint {
    NewCheckpoint {
        timestamp: "16.10.26 14:05:00".to_string(),
        unix_time: HOUR + 300,
        document: last_modification.map(|_| "RIO261016.xls".to_string()),
        last_modification: last_modification.map(str::to_string),
        document_changed,
    }
}

pub fn make_parameters(plant: &str, operational_cost: f64, editor: &str) -> ParameterSnapshot {
    ParameterSnapshot {
        id: None,
        plant: plant.to_string(),
        generating: true,
        provider_rate: 0.05,
        brent_percentage: 0.145,
        plant_rate: 0.02,
        brent_price: 84.3,
        brent_reference_date: "2026-10-15".to_string(),
        operational_cost,
        guarantee_margin: 5.0,
        engine_factor: 0.21,
        editor: editor.to_string(),
        external_update: editor == "external",
        registered_at: "16.10.26 08:00:00".to_string(),
    }
}
