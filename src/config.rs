use std::env;
use std::time::Duration;

use serde::Deserialize;

use crate::transport::MailtrapTransport;

/// Connect timeout applied to the HTTP client unless the configuration
/// overrides it.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 60;

/// Validated configuration for the Mailtrap transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub token: String,
    pub endpoint: Option<String>,
    pub http: HttpClientOptions,
}

/// HTTP-client options nested under the `http` key. Unknown keys are
/// ignored; a non-object value for the whole block is treated as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpClientOptions {
    pub connect_timeout: Option<u64>,
    pub timeout: Option<u64>,
}

impl HttpClientOptions {
    /// Effective connect timeout: the configured value when set, the
    /// default otherwise.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS))
    }
}

impl TransportConfig {
    /// Parse a configuration block. The only validation performed is on the
    /// token: it must be present, a string, and non-empty. The token format
    /// itself is not checked.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ConfigError> {
        let token = match value.get("token") {
            None | Some(serde_json::Value::Null) => return Err(ConfigError::MissingToken),
            Some(v) => v.as_str().ok_or(ConfigError::TokenNotAString)?,
        };
        if token.is_empty() {
            return Err(ConfigError::MissingToken);
        }

        let endpoint = value
            .get("endpoint")
            .and_then(|v| v.as_str())
            .map(str::to_owned);

        let http = match value.get("http") {
            Some(v) if v.is_object() => {
                serde_json::from_value(v.clone()).unwrap_or_default()
            }
            _ => HttpClientOptions::default(),
        };

        Ok(Self {
            token: token.to_owned(),
            endpoint,
            http,
        })
    }

    /// Load configuration from the environment (MAILTRAP_API_TOKEN,
    /// MAILTRAP_ENDPOINT).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let token = env::var("MAILTRAP_API_TOKEN").map_err(|_| ConfigError::MissingToken)?;
        if token.is_empty() {
            return Err(ConfigError::MissingToken);
        }

        Ok(Self {
            token,
            endpoint: env::var("MAILTRAP_ENDPOINT").ok(),
            http: HttpClientOptions::default(),
        })
    }

    /// Build the HTTP client: the default connect timeout is layered
    /// underneath the configured options, so an explicit value wins.
    pub fn build_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().connect_timeout(self.http.connect_timeout());
        if let Some(secs) = self.http.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build()
    }
}

/// Validate a configuration block and construct the transport with a
/// configured HTTP client. Token validation happens before any client is
/// built.
pub fn register_transport(value: &serde_json::Value) -> crate::Result<MailtrapTransport> {
    let config = TransportConfig::from_value(value)?;
    let client = config.build_client()?;

    let mut transport = MailtrapTransport::new(client, config.token);
    if let Some(endpoint) = config.endpoint {
        transport.set_endpoint(endpoint);
    }
    Ok(transport)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Mailtrap API token is required")]
    MissingToken,
    #[error("Mailtrap API token must be a string")]
    TokenNotAString,
}
