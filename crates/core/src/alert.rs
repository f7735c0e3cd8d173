//! Water quality alert raised after a sustained threshold breach.

use serde::{Deserialize, Serialize};

use crate::quality::thresholds::Parameter;
use crate::reading::Reading;
use crate::types::Timestamp;

/// An alert emitted by the breach tracker.
///
/// Immutable once created; handed to storage and to the broadcaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// When the alert was emitted.
    pub timestamp: Timestamp,
    pub device_id: String,
    /// The parameter whose breach triggered the alert.
    pub parameter: Parameter,
    /// Human-readable message, also used as the SMS body.
    pub message: String,
    /// Snapshot of the reading that pushed the breach past the alert duration.
    pub readings: Reading,
}
