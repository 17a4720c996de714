use chrono_tz::Tz;
use serde::Deserialize;

use clinic_core::config::Config;

/// Which SMS provider the service dispatches through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsMode {
    /// Log the message and report success.
    #[default]
    Demo,
    /// Deliver through the Twilio REST API.
    #[serde(alias = "twilio")]
    Live,
}

impl SmsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Demo => "demo",
            Self::Live => "live",
        }
    }
}

/// Outreach service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct OutreachConfig {
    /// Database connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3120). Env var: `OUTREACH_PORT`.
    #[serde(default = "default_port")]
    pub outreach_port: u16,
    /// `demo` or `live` (alias `twilio`). Env var: `SMS_MODE`.
    #[serde(default)]
    pub sms_mode: SmsMode,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    /// Sender number or messaging service id.
    pub twilio_from: Option<String>,
    #[serde(default = "default_twilio_api_base")]
    pub twilio_api_base: String,
    /// IANA zone defining the clinic's "today". Env var: `CLINIC_TIMEZONE`.
    #[serde(default = "default_timezone")]
    pub clinic_timezone: Tz,
}

impl Config for OutreachConfig {}

fn default_port() -> u16 {
    3120
}

fn default_twilio_api_base() -> String {
    "https://api.twilio.com".to_owned()
}

fn default_timezone() -> Tz {
    Tz::UTC
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required when SMS_MODE=live")]
    MissingVar(&'static str),
    #[error("failed to build sms http client: {0}")]
    HttpClient(String),
}

/// Credentials for the live SMS provider.
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub api_base: String,
}

impl OutreachConfig {
    /// Live-mode credentials. Blank values count as missing.
    pub fn twilio_credentials(&self) -> Result<TwilioCredentials, ConfigError> {
        fn required(value: &Option<String>, var: &'static str) -> Result<String, ConfigError> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .ok_or(ConfigError::MissingVar(var))
        }
        Ok(TwilioCredentials {
            account_sid: required(&self.twilio_account_sid, "TWILIO_ACCOUNT_SID")?,
            auth_token: required(&self.twilio_auth_token, "TWILIO_AUTH_TOKEN")?,
            from: required(&self.twilio_from, "TWILIO_FROM")?,
            api_base: self.twilio_api_base.trim_end_matches('/').to_owned(),
        })
    }
}
