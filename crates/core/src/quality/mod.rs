//! Water quality monitoring logic.
//!
//! [`thresholds`] is the stateless safe-range check; [`breach`] layers the
//! per-device, time-windowed alert state machine on top of it.

pub mod breach;
pub mod thresholds;

pub use breach::{AlertDurations, BreachState, BreachTracker, DEFAULT_ALERT_DURATION};
pub use thresholds::{evaluate, BreachDirection, Parameter, ParameterCheck, SafeRange};
