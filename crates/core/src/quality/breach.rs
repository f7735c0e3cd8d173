//! Time-windowed breach tracking with debounced alerts.
//!
//! A parameter only alerts after it has stayed out of range continuously for
//! the configured alert duration, and then only once per breach episode.
//!
//! ```text
//!            breached                 elapsed >= duration
//!  (none) ─────────────► Timing ─────────────────────────► Alerted
//!    ▲                     │                                  │
//!    └──── in range ───────┴───────────── in range ──────────┘
//! ```
//!
//! State is kept per device in a fixed three-slot record, one slot per
//! [`Parameter`]. A slot of `None` is the "no breach" state; recovery always
//! clears the slot, so an alert flag can never outlive its episode.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use crate::alert::Alert;
use crate::quality::thresholds::{evaluate, Parameter, ParameterCheck, SafeRange};
use crate::reading::Reading;
use crate::types::Timestamp;

/// Default continuous-breach duration before an alert is raised.
pub const DEFAULT_ALERT_DURATION: Duration = Duration::from_secs(180);

/// How long each parameter must stay out of range before alerting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDurations {
    /// Applies to every parameter without an override.
    pub default: Duration,
    pub ph: Option<Duration>,
    pub turbidity: Option<Duration>,
    pub tds: Option<Duration>,
}

impl Default for AlertDurations {
    fn default() -> Self {
        Self::uniform(DEFAULT_ALERT_DURATION)
    }
}

impl AlertDurations {
    /// Same duration for every parameter.
    pub fn uniform(duration: Duration) -> Self {
        Self {
            default: duration,
            ph: None,
            turbidity: None,
            tds: None,
        }
    }

    /// Set a per-parameter override.
    pub fn with_override(mut self, parameter: Parameter, duration: Duration) -> Self {
        match parameter {
            Parameter::Ph => self.ph = Some(duration),
            Parameter::Turbidity => self.turbidity = Some(duration),
            Parameter::Tds => self.tds = Some(duration),
        }
        self
    }

    /// Effective duration for a parameter.
    pub fn for_parameter(&self, parameter: Parameter) -> Duration {
        let specific = match parameter {
            Parameter::Ph => self.ph,
            Parameter::Turbidity => self.turbidity,
            Parameter::Tds => self.tds,
        };
        specific.unwrap_or(self.default)
    }
}

/// An ongoing breach episode for one `(device, parameter)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreachState {
    /// Timestamp of the first breaching sample of the episode.
    pub breach_started_at: Timestamp,
    /// Whether this episode has already produced its alert.
    pub alert_sent: bool,
}

/// Breach slots for every parameter of one device.
#[derive(Debug, Default)]
struct DeviceBreaches {
    slots: [Option<BreachState>; 3],
    /// Set once the entry has been unlinked from the registry. A task that
    /// locks a retired entry must look the device up again.
    retired: bool,
}

impl DeviceBreaches {
    fn is_clear(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Debounced, per-device alert state machine.
///
/// Shared across ingestion tasks behind an `Arc`. Each device has its own
/// lock, so readings for unrelated devices never wait on each other; the
/// registry lock is only held to look up, insert or remove a device entry.
/// Devices with no ongoing breach are dropped from the registry.
///
/// Lock order is always registry, then device.
#[derive(Debug)]
pub struct BreachTracker {
    range: SafeRange,
    durations: AlertDurations,
    devices: RwLock<HashMap<String, Arc<Mutex<DeviceBreaches>>>>,
}

impl BreachTracker {
    pub fn new(range: SafeRange, durations: AlertDurations) -> Self {
        Self {
            range,
            durations,
            devices: RwLock::new(HashMap::new()),
        }
    }

    /// Advance the state machine for one reading and return any alerts due.
    ///
    /// `now` is the observation time used for all elapsed-time arithmetic.
    /// Alerts come back in parameter order (ph, turbidity, tds).
    pub fn check_and_alert(&self, device_id: &str, reading: &Reading, now: Timestamp) -> Vec<Alert> {
        let checks = evaluate(reading, &self.range);
        let any_breach = checks.iter().any(ParameterCheck::is_breached);

        loop {
            let entry = if any_breach {
                self.device_entry(device_id)
            } else {
                // Nothing breaching: only an existing device can have state to clear.
                match self.devices.read().get(device_id) {
                    Some(entry) => Arc::clone(entry),
                    None => return Vec::new(),
                }
            };

            let mut device = entry.lock();
            if device.retired {
                continue;
            }

            let mut alerts = Vec::new();
            for check in &checks {
                let slot = &mut device.slots[check.parameter.index()];
                if let Some(alert) = self.step(slot, check, device_id, reading, now) {
                    alerts.push(alert);
                }
            }

            let clear = device.is_clear();
            drop(device);
            if clear {
                self.retire_if_clear(device_id, &entry);
            }
            return alerts;
        }
    }

    /// Re-open the alert for an ongoing breach episode.
    ///
    /// The episode keeps its start time, so the next breaching sample raises
    /// the alert again. Used when an alert returned by
    /// [`check_and_alert`](Self::check_and_alert) could not be delivered
    /// downstream. Returns `true` if an alerted episode was re-armed.
    pub fn rearm(&self, device_id: &str, parameter: Parameter) -> bool {
        let Some(entry) = self.devices.read().get(device_id).map(Arc::clone) else {
            return false;
        };
        let mut device = entry.lock();
        match device.slots[parameter.index()].as_mut() {
            Some(state) if state.alert_sent => {
                state.alert_sent = false;
                tracing::debug!(device_id, parameter = %parameter, "Alert re-armed");
                true
            }
            _ => false,
        }
    }

    /// Clear every breach record for a device.
    ///
    /// Returns `true` if the device had tracked state.
    pub fn reset_device(&self, device_id: &str) -> bool {
        let removed = self.devices.write().remove(device_id);
        match removed {
            Some(entry) => {
                entry.lock().retired = true;
                tracing::info!(device_id, "Breach tracking reset for device");
                true
            }
            None => false,
        }
    }

    /// Current breach episode for a `(device, parameter)` pair, if any.
    pub fn breach_state(&self, device_id: &str, parameter: Parameter) -> Option<BreachState> {
        let entry = Arc::clone(self.devices.read().get(device_id)?);
        let device = entry.lock();
        device.slots[parameter.index()]
    }

    /// Every slot for a device, indexed by [`Parameter::index`].
    ///
    /// Unknown devices report all slots clear.
    pub fn breach_snapshot(&self, device_id: &str) -> [Option<BreachState>; 3] {
        match self.devices.read().get(device_id) {
            Some(entry) => entry.lock().slots,
            None => [None; 3],
        }
    }

    /// Number of devices with at least one ongoing breach episode.
    pub fn tracked_devices(&self) -> usize {
        self.devices
            .read()
            .values()
            .filter(|entry| !entry.lock().is_clear())
            .count()
    }

    fn device_entry(&self, device_id: &str) -> Arc<Mutex<DeviceBreaches>> {
        if let Some(entry) = self.devices.read().get(device_id) {
            return Arc::clone(entry);
        }
        let mut devices = self.devices.write();
        Arc::clone(devices.entry(device_id.to_string()).or_default())
    }

    /// Unlink a device entry whose slots are all clear.
    ///
    /// Re-checks under both locks: another reading may have opened a breach
    /// since the caller released the device lock.
    fn retire_if_clear(&self, device_id: &str, entry: &Arc<Mutex<DeviceBreaches>>) {
        let mut devices = self.devices.write();
        let registered = devices
            .get(device_id)
            .is_some_and(|current| Arc::ptr_eq(current, entry));
        if !registered {
            return;
        }
        let mut device = entry.lock();
        if device.is_clear() {
            device.retired = true;
            drop(device);
            devices.remove(device_id);
        }
    }

    /// Apply one parameter check to its slot.
    fn step(
        &self,
        slot: &mut Option<BreachState>,
        check: &ParameterCheck,
        device_id: &str,
        reading: &Reading,
        now: Timestamp,
    ) -> Option<Alert> {
        let Some(direction) = check.breach else {
            match *slot {
                // An in-range sample older than the episode predates it.
                Some(state) if now < state.breach_started_at => {
                    tracing::debug!(
                        device_id,
                        parameter = %check.parameter,
                        "Ignoring in-range sample older than the ongoing breach"
                    );
                }
                Some(_) => {
                    *slot = None;
                    tracing::debug!(
                        device_id,
                        parameter = %check.parameter,
                        "Parameter back in range, breach cleared"
                    );
                }
                None => {}
            }
            return None;
        };

        let state = match slot {
            None => {
                *slot = Some(BreachState {
                    breach_started_at: now,
                    alert_sent: false,
                });
                tracing::debug!(
                    device_id,
                    parameter = %check.parameter,
                    value = check.value,
                    "Breach started"
                );
                return None;
            }
            Some(state) => state,
        };

        if state.alert_sent {
            return None;
        }

        let elapsed = now.signed_duration_since(state.breach_started_at);
        let required = self.durations.for_parameter(check.parameter);
        // A negative elapsed time (out-of-order sample) never satisfies the window.
        match elapsed.to_std() {
            Ok(elapsed_std) if elapsed_std >= required => {}
            _ => return None,
        }

        state.alert_sent = true;
        let elapsed_secs = elapsed.num_seconds();
        let message = self.alert_message(check, direction.as_str(), elapsed_secs);

        tracing::warn!(
            device_id,
            parameter = %check.parameter,
            value = check.value,
            elapsed_secs,
            "Sustained breach, raising alert"
        );

        Some(Alert {
            timestamp: now,
            device_id: device_id.to_string(),
            parameter: check.parameter,
            message,
            readings: reading.clone(),
        })
    }

    fn alert_message(&self, check: &ParameterCheck, direction: &str, elapsed_secs: i64) -> String {
        let bound = self.range.describe(check.parameter);
        match check.parameter {
            Parameter::Ph => format!(
                "ALERT: pH level {direction} ({:.2}) for {elapsed_secs} seconds. {bound}",
                check.value
            ),
            Parameter::Turbidity => format!(
                "ALERT: Turbidity {direction} ({:.1} NTU) for {elapsed_secs} seconds. {bound}",
                check.value
            ),
            Parameter::Tds => format!(
                "ALERT: TDS {direction} ({:.0} ppm) for {elapsed_secs} seconds. {bound}",
                check.value
            ),
        }
    }
}

impl Default for BreachTracker {
    fn default() -> Self {
        Self::new(SafeRange::default(), AlertDurations::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn at_secs(secs: i64) -> DateTime<Utc> {
        t0() + chrono::Duration::seconds(secs)
    }

    fn at_millis(millis: i64) -> DateTime<Utc> {
        t0() + chrono::Duration::milliseconds(millis)
    }

    fn reading(device_id: &str, ph: f64, turbidity: f64, tds: f64) -> Reading {
        Reading {
            timestamp: t0(),
            device_id: device_id.to_string(),
            ph,
            turbidity,
            tds,
            temperature: None,
        }
    }

    fn ph(device_id: &str, value: f64) -> Reading {
        reading(device_id, value, 20.0, 180.0)
    }

    fn tracker() -> BreachTracker {
        BreachTracker::default()
    }

    #[test]
    fn first_breaching_sample_does_not_alert() {
        let tracker = tracker();
        let alerts = tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(0));
        assert!(alerts.is_empty());

        let state = tracker.breach_state("d1", Parameter::Ph).unwrap();
        assert_eq!(state.breach_started_at, at_secs(0));
        assert!(!state.alert_sent);
    }

    #[test]
    fn fires_exactly_at_duration() {
        let tracker = tracker();
        tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(0));
        let alerts = tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(180));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].parameter, Parameter::Ph);
        assert_eq!(alerts[0].timestamp, at_secs(180));
    }

    #[test]
    fn does_not_fire_one_tick_before_duration() {
        let tracker = tracker();
        tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(0));
        let alerts = tracker.check_and_alert("d1", &ph("d1", 5.0), at_millis(179_999));
        assert!(alerts.is_empty());
    }

    #[test]
    fn debounces_repeated_breaching_samples() {
        let tracker = tracker();
        tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(0));

        let total: usize = (180..200)
            .map(|t| tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(t)).len())
            .sum();
        assert_eq!(total, 1);
        assert!(tracker.breach_state("d1", Parameter::Ph).unwrap().alert_sent);
    }

    #[test]
    fn documented_scenario_with_recovery() {
        let tracker = tracker();

        assert!(tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(0)).is_empty());
        assert!(tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(90)).is_empty());

        let alerts = tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(181));
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("too low"));
        assert!(alerts[0].message.contains("for 181 seconds"));

        // Back in range clears the episode without alerting.
        assert!(tracker.check_and_alert("d1", &ph("d1", 7.0), at_secs(182)).is_empty());
        assert!(tracker.breach_state("d1", Parameter::Ph).is_none());

        // A fresh breach needs the full duration again.
        assert!(tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(183)).is_empty());
        assert_eq!(
            tracker.breach_state("d1", Parameter::Ph).unwrap().breach_started_at,
            at_secs(183)
        );
        assert!(tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(362)).is_empty());
        assert_eq!(
            tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(363)).len(),
            1
        );
    }

    #[test]
    fn recovery_before_alert_restarts_window() {
        let tracker = tracker();
        tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(0));
        tracker.check_and_alert("d1", &ph("d1", 7.0), at_secs(100));
        tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(150));
        assert!(tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(200)).is_empty());
        assert_eq!(tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(330)).len(), 1);
    }

    #[test]
    fn parameters_alert_independently_in_one_call() {
        let tracker = tracker();
        let bad = reading("d1", 5.0, 150.0, 180.0);
        tracker.check_and_alert("d1", &bad, at_secs(0));
        let alerts = tracker.check_and_alert("d1", &bad, at_secs(200));

        let params: Vec<Parameter> = alerts.iter().map(|a| a.parameter).collect();
        assert_eq!(params, vec![Parameter::Ph, Parameter::Turbidity]);
    }

    #[test]
    fn one_parameter_recovering_does_not_touch_another() {
        let tracker = tracker();
        tracker.check_and_alert("d1", &reading("d1", 5.0, 150.0, 180.0), at_secs(0));
        // Turbidity recovers, pH keeps breaching.
        tracker.check_and_alert("d1", &reading("d1", 5.0, 20.0, 180.0), at_secs(60));
        let alerts = tracker.check_and_alert("d1", &reading("d1", 5.0, 20.0, 180.0), at_secs(180));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].parameter, Parameter::Ph);
        assert!(tracker.breach_state("d1", Parameter::Turbidity).is_none());
    }

    #[test]
    fn messages_include_value_direction_and_bound() {
        let tracker = tracker();
        let bad = reading("d1", 9.5, 150.0, 600.0);
        tracker.check_and_alert("d1", &bad, at_secs(0));
        let alerts = tracker.check_and_alert("d1", &bad, at_secs(181));
        assert_eq!(alerts.len(), 3);

        assert_eq!(
            alerts[0].message,
            "ALERT: pH level too high (9.50) for 181 seconds. Safe range: 6.0-9.0"
        );
        assert_eq!(
            alerts[1].message,
            "ALERT: Turbidity too high (150.0 NTU) for 181 seconds. Safe limit: 100.0 NTU"
        );
        assert_eq!(
            alerts[2].message,
            "ALERT: TDS too high (600 ppm) for 181 seconds. Safe limit: 500.0 ppm"
        );
    }

    #[test]
    fn alert_carries_reading_snapshot() {
        let tracker = tracker();
        tracker.check_and_alert("d1", &ph("d1", 4.2), at_secs(0));
        let trigger = Reading {
            temperature: Some(21.0),
            ..ph("d1", 4.3)
        };
        let alerts = tracker.check_and_alert("d1", &trigger, at_secs(180));
        assert_eq!(alerts[0].readings, trigger);
        assert_eq!(alerts[0].device_id, "d1");
    }

    #[test]
    fn devices_do_not_share_state() {
        let tracker = tracker();
        tracker.check_and_alert("a", &ph("a", 5.0), at_secs(0));
        tracker.check_and_alert("b", &ph("b", 5.0), at_secs(100));

        assert_eq!(tracker.check_and_alert("a", &ph("a", 5.0), at_secs(180)).len(), 1);
        assert!(tracker.check_and_alert("b", &ph("b", 5.0), at_secs(180)).is_empty());
        assert_eq!(tracker.check_and_alert("b", &ph("b", 5.0), at_secs(280)).len(), 1);
    }

    #[test]
    fn reset_device_clears_all_parameters() {
        let tracker = tracker();
        let bad = reading("d1", 5.0, 150.0, 600.0);
        tracker.check_and_alert("d1", &bad, at_secs(0));
        assert_eq!(tracker.tracked_devices(), 1);

        assert!(tracker.reset_device("d1"));
        assert!(!tracker.reset_device("d1"));
        assert_eq!(tracker.tracked_devices(), 0);
        for parameter in Parameter::ALL {
            assert!(tracker.breach_state("d1", parameter).is_none());
        }

        // After reset the next breach starts a new window.
        tracker.check_and_alert("d1", &bad, at_secs(200));
        assert!(tracker.check_and_alert("d1", &bad, at_secs(300)).is_empty());
    }

    #[test]
    fn snapshot_reports_every_slot() {
        let tracker = tracker();
        assert_eq!(tracker.breach_snapshot("d1"), [None; 3]);

        tracker.check_and_alert("d1", &reading("d1", 7.0, 150.0, 600.0), at_secs(10));
        let snapshot = tracker.breach_snapshot("d1");
        assert!(snapshot[Parameter::Ph.index()].is_none());
        assert_eq!(
            snapshot[Parameter::Turbidity.index()].map(|s| s.breach_started_at),
            Some(at_secs(10))
        );
        assert!(snapshot[Parameter::Tds.index()].is_some());
    }

    #[test]
    fn in_range_reading_for_unknown_device_creates_nothing() {
        let tracker = tracker();
        assert!(tracker.check_and_alert("new", &ph("new", 7.0), at_secs(0)).is_empty());
        assert!(tracker.devices.read().is_empty());
    }

    #[test]
    fn out_of_order_sample_never_fires() {
        let tracker = tracker();
        tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(500));
        assert!(tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(0)).is_empty());
        assert!(!tracker.breach_state("d1", Parameter::Ph).unwrap().alert_sent);
    }

    #[test]
    fn late_in_range_sample_does_not_clear_newer_breach() {
        let tracker = tracker();
        tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(100));
        assert!(tracker.check_and_alert("d1", &ph("d1", 7.0), at_secs(50)).is_empty());

        let state = tracker.breach_state("d1", Parameter::Ph).unwrap();
        assert_eq!(state.breach_started_at, at_secs(100));
        assert_eq!(tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(280)).len(), 1);
    }

    #[test]
    fn in_range_sample_at_breach_start_clears() {
        let tracker = tracker();
        tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(100));
        tracker.check_and_alert("d1", &ph("d1", 7.0), at_secs(100));
        assert!(tracker.breach_state("d1", Parameter::Ph).is_none());
    }

    #[test]
    fn rearm_lets_the_same_episode_alert_again() {
        let tracker = tracker();
        tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(0));
        assert_eq!(tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(180)).len(), 1);

        assert!(tracker.rearm("d1", Parameter::Ph));
        let state = tracker.breach_state("d1", Parameter::Ph).unwrap();
        assert_eq!(state.breach_started_at, at_secs(0));
        assert!(!state.alert_sent);

        let alerts = tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(185));
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("for 185 seconds"));
    }

    #[test]
    fn rearm_without_alerted_episode_is_noop() {
        let tracker = tracker();
        assert!(!tracker.rearm("unknown", Parameter::Ph));

        tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(0));
        assert!(!tracker.rearm("d1", Parameter::Ph));
        assert!(!tracker.rearm("d1", Parameter::Tds));
    }

    #[test]
    fn recovered_devices_leave_the_registry() {
        let tracker = tracker();
        for i in 0..50 {
            let device = format!("dev-{i}");
            tracker.check_and_alert(&device, &ph(&device, 5.0), at_secs(0));
        }
        assert_eq!(tracker.devices.read().len(), 50);

        for i in 0..50 {
            let device = format!("dev-{i}");
            tracker.check_and_alert(&device, &ph(&device, 7.0), at_secs(10));
        }
        assert!(tracker.devices.read().is_empty());
        assert_eq!(tracker.tracked_devices(), 0);
    }

    #[test]
    fn partial_recovery_keeps_the_device_entry() {
        let tracker = tracker();
        tracker.check_and_alert("d1", &reading("d1", 5.0, 150.0, 180.0), at_secs(0));
        tracker.check_and_alert("d1", &reading("d1", 5.0, 20.0, 180.0), at_secs(10));
        assert_eq!(tracker.devices.read().len(), 1);
        assert!(tracker.breach_state("d1", Parameter::Ph).is_some());
    }

    #[test]
    fn concurrent_flapping_on_one_device_stays_consistent() {
        let tracker = Arc::new(tracker());
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    for step in 0..500_i64 {
                        let value = if (step + worker) % 2 == 0 { 5.0 } else { 7.0 };
                        tracker.check_and_alert("d1", &ph("d1", value), at_secs(step));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // A final breaching sample must land in the registered entry.
        tracker.check_and_alert("d1", &ph("d1", 5.0), at_secs(10_000));
        assert!(tracker.breach_state("d1", Parameter::Ph).is_some());
        assert!(tracker.devices.read().len() <= 1);
    }

    #[test]
    fn per_parameter_override_applies_only_to_that_parameter() {
        let durations = AlertDurations::uniform(Duration::from_secs(180))
            .with_override(Parameter::Turbidity, Duration::from_secs(30));
        let tracker = BreachTracker::new(SafeRange::default(), durations);

        let bad = reading("d1", 5.0, 150.0, 180.0);
        tracker.check_and_alert("d1", &bad, at_secs(0));
        let alerts = tracker.check_and_alert("d1", &bad, at_secs(30));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].parameter, Parameter::Turbidity);
    }

    #[test]
    fn concurrent_devices_keep_independent_timing() {
        let tracker = Arc::new(tracker());
        let handles: Vec<_> = [("a", 0_i64), ("b", 120_i64)]
            .into_iter()
            .map(|(device, offset)| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    let mut fired_at = Vec::new();
                    for step in 0..=60 {
                        let t = offset + step * 5;
                        let alerts = tracker.check_and_alert(device, &ph(device, 5.0), at_secs(t));
                        if !alerts.is_empty() {
                            fired_at.push(t);
                        }
                    }
                    fired_at
                })
            })
            .collect();

        let results: Vec<Vec<i64>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results[0], vec![180]);
        assert_eq!(results[1], vec![300]);
    }
}
