//! AquaWatch domain crate.
//!
//! Pure domain logic with no I/O: reading and alert types, the threshold
//! evaluator, and the per-device breach tracker that debounces alerts.

pub mod alert;
pub mod error;
pub mod quality;
pub mod reading;
pub mod types;
