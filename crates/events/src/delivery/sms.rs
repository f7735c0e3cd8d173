//! SMS delivery through the Twilio Messages REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::Notifier;

/// HTTP request timeout for a single send.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const TWILIO_API_BASE: &str = "https://api.twilio.com";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway answered with something other than 200 or 201.
    #[error("SMS gateway returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Twilio credentials and phone numbers. All four are required to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number, in E.164 format.
    pub from_number: String,
    /// Recipient of water quality alerts.
    pub to_number: String,
}

// ---------------------------------------------------------------------------
// SmsDelivery
// ---------------------------------------------------------------------------

pub struct SmsDelivery {
    client: reqwest::Client,
    config: SmsConfig,
    api_base: String,
}

impl SmsDelivery {
    pub fn new(config: SmsConfig) -> Result<Self, SmsError> {
        Self::with_api_base(config, TWILIO_API_BASE)
    }

    /// Point the client at a different API host (used by tests).
    pub fn with_api_base(config: SmsConfig, api_base: &str) -> Result<Self, SmsError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            config,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint that creates a message for the configured account.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.config.account_sid
        )
    }

    /// Send one SMS with `body` to the configured recipient.
    pub async fn send(&self, body: &str) -> Result<(), SmsError> {
        let form = [
            ("To", self.config.to_number.as_str()),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(SmsError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmsDelivery {
    async fn notify(&self, message: &str) -> bool {
        match self.send(message).await {
            Ok(()) => {
                tracing::info!(to = %self.config.to_number, "Alert SMS sent");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Alert SMS delivery failed");
                false
            }
        }
    }

    fn channel(&self) -> &'static str {
        "sms"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
