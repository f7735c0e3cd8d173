use std::str::FromStr;
use std::time::Duration;

use aquawatch_core::quality::{AlertDurations, Parameter, SafeRange};
use aquawatch_events::delivery::SmsConfig;

/// Errors raised while loading configuration. Always fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable was set but could not be parsed.
    #[error("{name} has invalid value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// The loaded values are individually valid but inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Threshold and debounce settings for the breach tracker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorConfig {
    pub safe_range: SafeRange,
    pub durations: AlertDurations,
}

/// Settings for the synthetic device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    pub enabled: bool,
    pub device_id: String,
    pub interval_secs: u64,
    /// Inject an out-of-range excursion every 20th reading.
    pub alert_mode: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            device_id: "esp32_dummy".to_string(),
            interval_secs: 5,
            alert_mode: false,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Postgres URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub monitor: MonitorConfig,
    /// Twilio settings; `None` unless all four variables are set.
    pub sms: Option<SmsConfig>,
    pub simulator: SimulatorConfig,
    /// Outbound queue capacity per live subscriber (default: `64`).
    pub subscriber_buffer: usize,
    /// WebSocket write timeout in seconds (default: `5`).
    pub ws_send_timeout_secs: u64,
    /// Heartbeat ping interval in seconds (default: `30`).
    pub ws_heartbeat_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            database_url: None,
            monitor: MonitorConfig::default(),
            sms: None,
            simulator: SimulatorConfig::default(),
            subscriber_buffer: aquawatch_events::DEFAULT_SUBSCRIBER_BUFFER,
            ws_send_timeout_secs: 5,
            ws_heartbeat_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `8000`                  |
    /// | `CORS_ORIGINS`               | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`      | `30`                    |
    /// | `DATABASE_URL`               | unset (memory store)    |
    /// | `ALERT_DURATION_SECONDS`     | `180`                   |
    /// | `ALERT_DURATION_<P>_SECONDS` | unset                   |
    /// | `PH_MIN` / `PH_MAX`          | `6.0` / `9.0`           |
    /// | `TURBIDITY_MAX_NTU`          | `100.0`                 |
    /// | `TDS_MAX_PPM`                | `500.0`                 |
    /// | `SUBSCRIBER_BUFFER`          | `64`                    |
    /// | `WS_SEND_TIMEOUT_SECS`       | `5`                     |
    /// | `WS_HEARTBEAT_SECS`          | `30`                    |
    /// | `SIMULATOR_*`                | disabled                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };
        let defaults = Self::default();

        let cors_origins = match env.get("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        let safe_range = SafeRange {
            ph_min: env.parse_or("PH_MIN", defaults.monitor.safe_range.ph_min)?,
            ph_max: env.parse_or("PH_MAX", defaults.monitor.safe_range.ph_max)?,
            turbidity_max: env
                .parse_or("TURBIDITY_MAX_NTU", defaults.monitor.safe_range.turbidity_max)?,
            tds_max: env.parse_or("TDS_MAX_PPM", defaults.monitor.safe_range.tds_max)?,
        };

        let default_secs = env.parse_or(
            "ALERT_DURATION_SECONDS",
            defaults.monitor.durations.default.as_secs(),
        )?;
        let mut durations = AlertDurations::uniform(Duration::from_secs(default_secs));
        for (name, parameter) in [
            ("ALERT_DURATION_PH_SECONDS", Parameter::Ph),
            ("ALERT_DURATION_TURBIDITY_SECONDS", Parameter::Turbidity),
            ("ALERT_DURATION_TDS_SECONDS", Parameter::Tds),
        ] {
            if let Some(secs) = env.parse::<u64>(name)? {
                durations = durations.with_override(parameter, Duration::from_secs(secs));
            }
        }

        let sms = match (
            env.get("TWILIO_ACCOUNT_SID"),
            env.get("TWILIO_AUTH_TOKEN"),
            env.get("TWILIO_PHONE_NUMBER"),
            env.get("WATER_ALERT_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number), Some(to_number)) => {
                Some(SmsConfig {
                    account_sid,
                    auth_token,
                    from_number,
                    to_number,
                })
            }
            _ => None,
        };

        let simulator = SimulatorConfig {
            enabled: env.flag("SIMULATOR_ENABLED", defaults.simulator.enabled)?,
            device_id: env
                .get("SIMULATOR_DEVICE_ID")
                .unwrap_or(defaults.simulator.device_id),
            interval_secs: env.parse_or("SIMULATOR_INTERVAL_SECS", defaults.simulator.interval_secs)?,
            alert_mode: env.flag("SIMULATOR_ALERT_MODE", defaults.simulator.alert_mode)?,
        };

        let config = Self {
            host: env.get("HOST").unwrap_or(defaults.host),
            port: env.parse_or("PORT", defaults.port)?,
            cors_origins,
            request_timeout_secs: env
                .parse_or("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            shutdown_timeout_secs: env
                .parse_or("SHUTDOWN_TIMEOUT_SECS", defaults.shutdown_timeout_secs)?,
            database_url: env.get("DATABASE_URL"),
            monitor: MonitorConfig {
                safe_range,
                durations,
            },
            sms,
            simulator,
            subscriber_buffer: env.parse_or("SUBSCRIBER_BUFFER", defaults.subscriber_buffer)?,
            ws_send_timeout_secs: env
                .parse_or("WS_SEND_TIMEOUT_SECS", defaults.ws_send_timeout_secs)?,
            ws_heartbeat_secs: env.parse_or("WS_HEARTBEAT_SECS", defaults.ws_heartbeat_secs)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.monitor
            .safe_range
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let durations = &self.monitor.durations;
        if Parameter::ALL
            .into_iter()
            .any(|p| durations.for_parameter(p).is_zero())
        {
            return Err(ConfigError::Invalid(
                "alert durations must be greater than zero".to_string(),
            ));
        }
        if self.subscriber_buffer == 0 {
            return Err(ConfigError::Invalid(
                "SUBSCRIBER_BUFFER must be at least 1".to_string(),
            ));
        }
        if self.ws_send_timeout_secs == 0 || self.ws_heartbeat_secs == 0 {
            return Err(ConfigError::Invalid(
                "WebSocket timeouts must be greater than zero".to_string(),
            ));
        }
        if self.simulator.enabled && self.simulator.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "SIMULATOR_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }
        if let Some(origin) = self
            .cors_origins
            .iter()
            .find(|o| o.parse::<axum::http::HeaderValue>().is_err())
        {
            return Err(ConfigError::Invalid(format!("invalid CORS origin {origin:?}")));
        }
        Ok(())
    }
}

/// Typed access to string-valued variables. Blank values count as unset.
struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name,
                    reason: e.to_string(),
                    value,
                }),
        }
    }

    fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.parse(name)?.unwrap_or(default))
    }

    fn flag(&self, name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue {
                    name,
                    value,
                    reason: "expected true or false".to_string(),
                }),
            },
        }
    }
}
