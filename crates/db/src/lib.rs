use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

mod aggregates;
mod checkpoints;
mod error;
mod helpers;
mod migrations;
mod parameters;
mod samples;
mod types;

pub use error::{DbError, Result};
pub use helpers::fixed_scale;
pub use migrations::MIGRATIONS;
pub use types::SampleTable;

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        // The scheduler loop and a manual tick may hold the file at the same time.
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self { conn })
    }
}
