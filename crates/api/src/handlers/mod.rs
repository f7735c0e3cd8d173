pub mod alerts;
pub mod devices;
pub mod readings;
pub mod stats;
