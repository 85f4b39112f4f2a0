use cmg_core::{NewCheckpoint, TrackingCheckpoint};
use rusqlite::{OptionalExtension, params};

use crate::Db;
use crate::error::Result;
use crate::helpers::row_to_checkpoint;

impl Db {
    pub fn insert_checkpoint(&self, checkpoint: &NewCheckpoint) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO tracking_checkpoint (
              timestamp, unix_time, document, last_modification, document_changed
            ) VALUES (
              ?1, ?2, ?3, ?4, ?5
            )
            "#,
            params![
                checkpoint.timestamp,
                checkpoint.unix_time,
                checkpoint.document,
                checkpoint.last_modification,
                checkpoint.document_changed,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn latest_checkpoint(&self) -> Result<Option<TrackingCheckpoint>> {
        let checkpoint = self
            .conn
            .query_row(
                r#"
                SELECT id, timestamp, unix_time, document, last_modification, document_changed
                FROM tracking_checkpoint
                ORDER BY id DESC
                LIMIT 1
                "#,
                [],
                row_to_checkpoint,
            )
            .optional()?;
        Ok(checkpoint)
    }

    /// The checkpoint that recorded the document change before the most recent one.
    pub fn previous_document_change(&self) -> Result<Option<TrackingCheckpoint>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, timestamp, unix_time, document, last_modification, document_changed
            FROM tracking_checkpoint
            WHERE document_changed = 1
            ORDER BY id DESC
            LIMIT 2
            "#,
        )?;
        let rows = stmt
            .query_map([], row_to_checkpoint)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().nth(1))
    }

    /// Whether `last_modification` differs from what the latest checkpoint saw.
    /// An empty history or an unknown modification counts as unchanged.
    pub fn document_changed_since_last(&self, last_modification: Option<&str>) -> Result<bool> {
        let Some(current) = last_modification else {
            return Ok(false);
        };
        let Some(previous) = self.latest_checkpoint()? else {
            return Ok(false);
        };
        Ok(previous.last_modification.as_deref() != Some(current))
    }

    pub fn count_checkpoints(&self) -> Result<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM tracking_checkpoint", [], |row| {
                    row.get(0)
                })?;
        Ok(count.max(0) as u64)
    }
}
