use cmg_core::{HOUR_SECONDS, HourlyAggregate};
use rusqlite::{OptionalExtension, params};

use crate::Db;
use crate::error::Result;
use crate::helpers::{fixed_scale, row_to_hourly_aggregate};

impl Db {
    /// Writes the weighted average for `(node, unix_time)`, replacing the value
    /// and human timestamp of an existing row for the same key.
    pub fn upsert_hourly_aggregate(
        &self,
        node: &str,
        unix_time: i64,
        timestamp: &str,
        cmg_weighted: f64,
    ) -> Result<()> {
        let cmg_weighted = fixed_scale("cmg_weighted", cmg_weighted, 7, 4)?;
        self.conn.execute(
            r#"
            INSERT INTO hourly_aggregate (node, timestamp, unix_time, cmg_weighted)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(node, unix_time) DO UPDATE SET
              timestamp = excluded.timestamp,
              cmg_weighted = excluded.cmg_weighted
            "#,
            params![node, timestamp, unix_time, cmg_weighted],
        )?;
        Ok(())
    }

    /// Aggregates with `unix_time >= now - hours * 3600`, the bound included.
    pub fn hourly_aggregates_since(&self, now: i64, hours: u32) -> Result<Vec<HourlyAggregate>> {
        let since = now - i64::from(hours) * HOUR_SECONDS;
        let mut stmt = self.conn.prepare(
            r#"
            SELECT node, timestamp, unix_time, cmg_weighted
            FROM hourly_aggregate
            WHERE unix_time >= ?1
            ORDER BY unix_time ASC, node ASC
            "#,
        )?;
        let rows = stmt.query_map(params![since], row_to_hourly_aggregate)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn latest_hourly_aggregate(&self, node: &str) -> Result<Option<HourlyAggregate>> {
        let aggregate = self
            .conn
            .query_row(
                r#"
                SELECT node, timestamp, unix_time, cmg_weighted
                FROM hourly_aggregate
                WHERE node = ?1
                ORDER BY unix_time DESC
                LIMIT 1
                "#,
                params![node],
                row_to_hourly_aggregate,
            )
            .optional()?;
        Ok(aggregate)
    }

    pub fn count_hourly_aggregates(&self, node: &str, unix_time: i64) -> Result<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM hourly_aggregate WHERE node = ?1 AND unix_time = ?2",
            params![node, unix_time],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}
