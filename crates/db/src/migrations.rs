use rusqlite::Connection;

use crate::Db;
use crate::error::Result;

const MIGRATION_0001: &str = include_str!("../migrations/0001_init.sql");
const MIGRATION_0002: &str = include_str!("../migrations/0002_add_plant_parameter.sql");
const MIGRATION_0003: &str = include_str!("../migrations/0003_unique_hourly_aggregate.sql");
const MIGRATION_0004: &str = include_str!("../migrations/0004_unique_raw_sample.sql");

pub const MIGRATIONS: &[(&str, &str)] = &[
    ("0001_init", MIGRATION_0001),
    ("0002_add_plant_parameter", MIGRATION_0002),
    ("0003_unique_hourly_aggregate", MIGRATION_0003),
    ("0004_unique_raw_sample", MIGRATION_0004),
];

impl Db {
    pub fn migrate(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (name, sql) in MIGRATIONS {
            if *name == "0002_add_plant_parameter" {
                tx.execute_batch(sql)?;
                ensure_parameter_columns(&tx)?;
                continue;
            }
            tx.execute_batch(sql)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

// Parameter tables created by the editor before the margin columns existed.
fn ensure_parameter_columns(conn: &Connection) -> Result<()> {
    if !table_has_column(conn, "plant_parameter", "guarantee_margin")? {
        conn.execute(
            "ALTER TABLE plant_parameter ADD COLUMN guarantee_margin REAL NOT NULL DEFAULT 0",
            [],
        )?;
    }
    if !table_has_column(conn, "plant_parameter", "engine_factor")? {
        conn.execute(
            "ALTER TABLE plant_parameter ADD COLUMN engine_factor REAL NOT NULL DEFAULT 0",
            [],
        )?;
    }
    if !table_has_column(conn, "plant_parameter", "external_update")? {
        conn.execute(
            "ALTER TABLE plant_parameter ADD COLUMN external_update INTEGER NOT NULL DEFAULT 0",
            [],
        )?;
    }
    Ok(())
}
