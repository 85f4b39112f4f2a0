#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{column} value {value} does not fit DECIMAL({precision},{scale})")]
    OutOfRange {
        column: &'static str,
        value: f64,
        precision: u32,
        scale: u32,
    },
}

pub type Result<T> = std::result::Result<T, DbError>;
