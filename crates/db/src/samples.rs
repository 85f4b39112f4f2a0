use cmg_core::{HOUR_SECONDS, LastKnownReading, RawSample};
use rusqlite::{OptionalExtension, params};

use crate::Db;
use crate::error::Result;
use crate::helpers::{fixed_scale, row_to_raw_sample};
use crate::types::SampleTable;

impl Db {
    /// Appends a raw sample and returns its row id, or `None` when a sample
    /// for the same node and instant is already stored. Raw samples are never
    /// updated.
    pub fn insert_raw_sample(&self, sample: &RawSample) -> Result<Option<i64>> {
        let cmg = fixed_scale("cmg", sample.cmg, 7, 3)?;
        let inserted = self.conn.execute(
            r#"
            INSERT INTO raw_sample (
              node, year, month, day, hour, unix_time, decoupled, cmg, reference_node
            ) VALUES (
              ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9
            )
            ON CONFLICT(node, unix_time) DO NOTHING
            "#,
            params![
                sample.node,
                sample.year,
                sample.month,
                sample.day,
                sample.hour,
                sample.unix_time,
                sample.decoupled,
                cmg,
                sample.reference_node,
            ],
        )?;
        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(self.conn.last_insert_rowid()))
    }

    pub fn row_exists(&self, node: &str, unix_time: i64, table: SampleTable) -> Result<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE node = ?1 AND unix_time = ?2 LIMIT 1",
            table.table_name()
        );
        let found = self
            .conn
            .query_row(&sql, params![node, unix_time], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Reference node, decoupling flag and cost of the most recently inserted
    /// raw sample for `node`.
    pub fn last_known_reading(&self, node: &str) -> Result<Option<LastKnownReading>> {
        let reading = self
            .conn
            .query_row(
                r#"
                SELECT reference_node, decoupled, cmg
                FROM raw_sample
                WHERE node = ?1
                ORDER BY id DESC
                LIMIT 1
                "#,
                params![node],
                |row| {
                    Ok(LastKnownReading {
                        reference_node: row.get(0)?,
                        decoupled: row.get(1)?,
                        cmg: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(reading)
    }

    /// Raw samples of `node` inside `[hour_start, hour_start + 3599]`, oldest first.
    pub fn raw_samples_in_hour(&self, node: &str, hour_start: i64) -> Result<Vec<RawSample>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT node, year, month, day, hour, unix_time, decoupled, cmg, reference_node
            FROM raw_sample
            WHERE node = ?1 AND unix_time >= ?2 AND unix_time <= ?3
            ORDER BY unix_time ASC, id ASC
            "#,
        )?;
        let rows = stmt.query_map(
            params![node, hour_start, hour_start + HOUR_SECONDS - 1],
            row_to_raw_sample,
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Raw samples of every node with `unix_time >= since`, oldest first.
    pub fn raw_samples_since(&self, since: i64) -> Result<Vec<RawSample>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT node, year, month, day, hour, unix_time, decoupled, cmg, reference_node
            FROM raw_sample
            WHERE unix_time >= ?1
            ORDER BY unix_time ASC, id ASC
            "#,
        )?;
        let rows = stmt.query_map(params![since], row_to_raw_sample)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn count_raw_samples(&self, node: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM raw_sample WHERE node = ?1",
            params![node],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}
