/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Device identifiers are free-form strings supplied by the sensor.
pub type DeviceId = String;
