//! Row structs for the `water_readings` and `water_alerts` tables.
//!
//! Each submodule pairs a `FromRow` struct with its conversion into the
//! domain type from `aquawatch_core`.

pub mod alert;
pub mod reading;
