use std::time::Duration;

use chrono::NaiveDate;

/// Errors reported by a [`DocumentSource`]. Unavailability is not an error;
/// it is expressed as [`FetchedDocument::NotAvailable`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("{0}")]
    Transient(String),
    #[error("{call} did not finish within {after:?}")]
    Timeout { call: &'static str, after: Duration },
    #[error("{0}")]
    DataQuality(String),
}

/// The coordinator's daily index document, as fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub day: NaiveDate,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchedDocument {
    Available(Document),
    NotAvailable,
}

/// What the index document says about today's scheduling bulletin.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub available_today: bool,
    pub identifier: Option<String>,
    pub last_modified: Option<String>,
}

pub struct BulletinTables<T> {
    pub rio: T,
    pub tco: T,
    pub fp: T,
    pub temp_files: Vec<String>,
}

/// Collaborator that locates the daily bulletin and turns it into tables.
///
/// Implementations may block on the network or the filesystem; every call is
/// made from a worker thread under a timeout, so they must be `Send + Sync`.
pub trait DocumentSource: Send + Sync + 'static {
    type Table: Send + 'static;

    fn fetch_document(&self, day: NaiveDate) -> Result<FetchedDocument, SourceError>;

    fn parse_document(&self, document: &Document) -> Result<DocumentInfo, SourceError>;

    fn fetch_and_parse_tables(
        &self,
        identifier: &str,
    ) -> Result<BulletinTables<Self::Table>, SourceError>;

    /// Corrected cost for `node` at `hour` (0-23, local) and the reference
    /// unit it was derived from.
    fn compute_corrected_cost(
        &self,
        hour: u32,
        tco: &Self::Table,
        fp: &Self::Table,
        rio: &Self::Table,
        reference_hint: &str,
        node: &str,
    ) -> Result<(f64, String), SourceError>;

    fn delete_temp_file(&self, name: &str) -> Result<(), SourceError>;
}
