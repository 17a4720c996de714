use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{ConfigError, OutreachConfig, SmsMode, TwilioCredentials};
use crate::domain::repository::SmsProvider;
use crate::error::ProviderError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ── Simulated provider ───────────────────────────────────────────────────────

/// Logs the message and always succeeds.
#[derive(Clone, Default)]
pub struct SimulatedSmsProvider;

impl SmsProvider for SimulatedSmsProvider {
    async fn send(&self, to: &str, body: &str) -> Result<(), ProviderError> {
        info!(to, chars = body.chars().count(), "simulated sms dispatch");
        Ok(())
    }
}

// ── Twilio provider ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TwilioSmsProvider {
    client: Client,
    credentials: TwilioCredentials,
}

/// Error body returned by the Twilio REST API.
#[derive(Deserialize)]
struct TwilioErrorBody {
    message: Option<String>,
}

impl TwilioSmsProvider {
    pub fn new(credentials: TwilioCredentials) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            credentials,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.credentials.api_base, self.credentials.account_sid
        )
    }
}

impl SmsProvider for TwilioSmsProvider {
    async fn send(&self, to: &str, body: &str) -> Result<(), ProviderError> {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("To", to)
            .append_pair("From", &self.credentials.from)
            .append_pair("Body", body)
            .finish();

        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(
                &self.credentials.account_sid,
                Some(&self.credentials.auth_token),
            )
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let message = resp
            .json::<TwilioErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| format!("twilio responded with {status}"));
        warn!(status = status.as_u16(), %message, "twilio rejected message");
        Err(ProviderError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

// ── Gateway ──────────────────────────────────────────────────────────────────

/// Provider chosen at startup by `SMS_MODE`.
#[derive(Clone)]
pub enum SmsGateway {
    Simulated(SimulatedSmsProvider),
    Twilio(TwilioSmsProvider),
}

impl SmsGateway {
    /// Live mode fails fast when credentials are missing.
    pub fn from_config(config: &OutreachConfig) -> Result<Self, ConfigError> {
        match config.sms_mode {
            SmsMode::Demo => Ok(Self::Simulated(SimulatedSmsProvider)),
            SmsMode::Live => {
                let credentials = config.twilio_credentials()?;
                let provider = TwilioSmsProvider::new(credentials)
                    .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
                Ok(Self::Twilio(provider))
            }
        }
    }

    pub fn mode(&self) -> SmsMode {
        match self {
            Self::Simulated(_) => SmsMode::Demo,
            Self::Twilio(_) => SmsMode::Live,
        }
    }
}

impl SmsProvider for SmsGateway {
    async fn send(&self, to: &str, body: &str) -> Result<(), ProviderError> {
        match self {
            Self::Simulated(p) => p.send(to, body).await,
            Self::Twilio(p) => p.send(to, body).await,
        }
    }
}
