mod aggregate;
mod oracle;
mod orchestrator;
mod resolver;
mod source;
mod spool;
mod timeout;
mod types;

pub use aggregate::{WindowRefresh, refresh_window};
pub use oracle::exists;
pub use orchestrator::Orchestrator;
pub use resolver::Resolver;
pub use source::{
    BulletinTables, Document, DocumentInfo, DocumentSource, FetchedDocument, SourceError,
};
pub use spool::{SpoolSource, TableRow};
pub use timeout::call_with_timeout;
pub use types::{
    IngestError, NodeOutcome, NodeReport, Result, TickConfig, TickReport, TickStage,
};
