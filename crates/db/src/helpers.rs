use cmg_core::{HourlyAggregate, ParameterSnapshot, RawSample, TrackingCheckpoint};
use rusqlite::Row;

use crate::error::{DbError, Result};

/// Rounds `value` to `scale` fractional digits and checks it fits a SQL
/// `DECIMAL(precision, scale)` column.
pub fn fixed_scale(column: &'static str, value: f64, precision: u32, scale: u32) -> Result<f64> {
    let factor = 10f64.powi(scale as i32);
    let rounded = (value * factor).round() / factor;
    let limit = 10f64.powi((precision - scale) as i32);
    if !rounded.is_finite() || rounded.abs() >= limit {
        return Err(DbError::OutOfRange {
            column,
            value,
            precision,
            scale,
        });
    }
    Ok(rounded)
}

pub(crate) fn row_to_raw_sample(row: &Row<'_>) -> std::result::Result<RawSample, rusqlite::Error> {
    Ok(RawSample {
        node: row.get(0)?,
        year: row.get(1)?,
        month: row.get(2)?,
        day: row.get(3)?,
        hour: row.get(4)?,
        unix_time: row.get(5)?,
        decoupled: row.get(6)?,
        cmg: row.get(7)?,
        reference_node: row.get(8)?,
    })
}

pub(crate) fn row_to_hourly_aggregate(
    row: &Row<'_>,
) -> std::result::Result<HourlyAggregate, rusqlite::Error> {
    Ok(HourlyAggregate {
        node: row.get(0)?,
        timestamp: row.get(1)?,
        unix_time: row.get(2)?,
        cmg_weighted: row.get(3)?,
    })
}

pub(crate) fn row_to_checkpoint(
    row: &Row<'_>,
) -> std::result::Result<TrackingCheckpoint, rusqlite::Error> {
    Ok(TrackingCheckpoint {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        unix_time: row.get(2)?,
        document: row.get(3)?,
        last_modification: row.get(4)?,
        document_changed: row.get(5)?,
    })
}

pub(crate) fn row_to_parameter_snapshot(
    row: &Row<'_>,
) -> std::result::Result<ParameterSnapshot, rusqlite::Error> {
    Ok(ParameterSnapshot {
        id: Some(row.get::<_, i64>(0)?),
        plant: row.get(1)?,
        generating: row.get(2)?,
        provider_rate: row.get(3)?,
        brent_percentage: row.get(4)?,
        plant_rate: row.get(5)?,
        brent_price: row.get(6)?,
        brent_reference_date: row.get(7)?,
        operational_cost: row.get(8)?,
        guarantee_margin: row.get(9)?,
        engine_factor: row.get(10)?,
        editor: row.get(11)?,
        external_update: row.get(12)?,
        registered_at: row.get(13)?,
    })
}
