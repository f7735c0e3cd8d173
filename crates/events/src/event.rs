//! The live event pushed to dashboard subscribers.

use aquawatch_core::alert::Alert;
use aquawatch_core::reading::Reading;
use serde::{Deserialize, Serialize};

/// Tagged wire event: `{"type": "reading" | "alert", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum LiveEvent {
    Reading(Reading),
    Alert(Alert),
}

impl LiveEvent {
    /// The `type` tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            LiveEvent::Reading(_) => "reading",
            LiveEvent::Alert(_) => "alert",
        }
    }
}

#[cfg(test)]
mod tests {
    use aquawatch_core::quality::Parameter;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn sample_reading() -> Reading {
        Reading {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
            device_id: "d1".to_string(),
            ph: 7.25,
            turbidity: 12.0,
            tds: 240.0,
            temperature: None,
        }
    }

    #[test]
    fn reading_event_wire_shape() {
        let json = serde_json::to_value(LiveEvent::Reading(sample_reading())).unwrap();
        assert_eq!(json["type"], "reading");
        assert_eq!(json["data"]["device_id"], "d1");
        assert_eq!(json["data"]["ph"], 7.25);
        assert_eq!(json["data"]["timestamp"], "2025-06-01T12:00:00Z");
        assert!(json["data"]["temperature"].is_null());
    }

    #[test]
    fn alert_event_wire_shape() {
        let reading = sample_reading();
        let event = LiveEvent::Alert(Alert {
            timestamp: reading.timestamp,
            device_id: "d1".to_string(),
            parameter: Parameter::Turbidity,
            message: "ALERT".to_string(),
            readings: reading,
        });
        assert_eq!(event.kind(), "alert");

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "alert");
        assert_eq!(json["data"]["parameter"], "turbidity");
        assert_eq!(json["data"]["readings"]["tds"], 240.0);
    }
}
