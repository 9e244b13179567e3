pub mod ingest;
pub mod performance;
