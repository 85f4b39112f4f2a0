use cmg_core::ParameterSnapshot;
use rusqlite::{OptionalExtension, params};

use crate::Db;
use crate::error::Result;
use crate::helpers::{fixed_scale, row_to_parameter_snapshot};

const SNAPSHOT_COLUMNS: &str = r#"
    id, plant, generating, provider_rate, brent_percentage, plant_rate, brent_price,
    brent_reference_date, operational_cost, guarantee_margin, engine_factor, editor,
    external_update, registered_at
"#;

impl Db {
    /// Appends a parameter snapshot. Rows are written by the parameter editor;
    /// the monitor itself only reads them.
    pub fn insert_parameter_snapshot(&self, snapshot: &ParameterSnapshot) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO plant_parameter (
              plant, generating, provider_rate, brent_percentage, plant_rate, brent_price,
              brent_reference_date, operational_cost, guarantee_margin, engine_factor,
              editor, external_update, registered_at
            ) VALUES (
              ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13
            )
            "#,
            params![
                snapshot.plant,
                snapshot.generating,
                fixed_scale("provider_rate", snapshot.provider_rate, 7, 4)?,
                fixed_scale("brent_percentage", snapshot.brent_percentage, 7, 4)?,
                fixed_scale("plant_rate", snapshot.plant_rate, 7, 4)?,
                fixed_scale("brent_price", snapshot.brent_price, 7, 3)?,
                snapshot.brent_reference_date,
                fixed_scale("operational_cost", snapshot.operational_cost, 7, 3)?,
                fixed_scale("guarantee_margin", snapshot.guarantee_margin, 7, 3)?,
                fixed_scale("engine_factor", snapshot.engine_factor, 7, 4)?,
                snapshot.editor,
                snapshot.external_update,
                snapshot.registered_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn latest_parameter_snapshot(&self, plant: &str) -> Result<Option<ParameterSnapshot>> {
        let sql = format!(
            "SELECT {} FROM plant_parameter WHERE plant = ?1 ORDER BY id DESC LIMIT 1",
            SNAPSHOT_COLUMNS
        );
        let snapshot = self
            .conn
            .query_row(&sql, params![plant], row_to_parameter_snapshot)
            .optional()?;
        Ok(snapshot)
    }

    /// Most recent snapshots across all plants, newest first.
    pub fn recent_parameter_snapshots(
        &self,
        limit: u32,
        manual_only: bool,
    ) -> Result<Vec<ParameterSnapshot>> {
        let filter = if manual_only {
            "WHERE external_update = 0"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {} FROM plant_parameter {} ORDER BY id DESC LIMIT ?1",
            SNAPSHOT_COLUMNS, filter
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit], row_to_parameter_snapshot)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}
