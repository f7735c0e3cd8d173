use aquawatch_core::error::CoreError;
use aquawatch_db::StoreError;

/// Failure of a single ingest call.
///
/// Delivery-side failures (live subscribers, SMS) never surface here.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The inbound reading was rejected before touching storage.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// Appending the reading or one of its alerts failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}
