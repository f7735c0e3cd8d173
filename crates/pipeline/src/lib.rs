//! Ingestion pipeline for water quality readings.
//!
//! Wires the storage collaborator, the breach tracker, the live event
//! broadcaster and the alert notifier together. None of those components
//! know about each other; this crate is the only place they meet.

pub mod error;
pub mod ingest;

pub use error::IngestError;
pub use ingest::{IngestOutcome, IngestPipeline};
