use cmg_db::{Db, SampleTable};
use tracing::warn;

/// Whether a row for `(node, unix_time)` exists in `table`.
///
/// A failed lookup reports `false`; the unique key on aggregates and the
/// per-hour raw check on the next tick bound the damage of a wrong answer.
pub fn exists(db: &Db, node: &str, unix_time: i64, table: SampleTable) -> bool {
    match db.row_exists(node, unix_time, table) {
        Ok(found) => found,
        Err(err) => {
            warn!(
                node,
                hour_epoch = unix_time,
                table = table.table_name(),
                error = %err,
                "existence check failed, treating row as missing"
            );
            false
        }
    }
}
