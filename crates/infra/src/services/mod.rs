//! Application services.

pub mod ingest;

pub use ingest::{ProcessedTranscript, TranscriptIngestService};
