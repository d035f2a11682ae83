use crate::config::AuthGatewaySettings;
use crate::error::{BridgeError, ExchangeError};
use crate::telemetry::TracedClientExt;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Backend operation that turns a partner token into a local session.
///
/// A single attempt per call. Implementations own their timeout policy; the
/// returned future may take arbitrarily long.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Returns the backend's human-readable message when a session was established.
    async fn exchange_token(
        &self,
        token: &Secret<String>,
        user_id: &str,
    ) -> Result<String, ExchangeError>;
}

#[derive(Serialize)]
struct TokenLoginRequest<'a> {
    token: &'a str,
    user_id: &'a str,
}

#[derive(Deserialize)]
struct TokenLoginResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

impl TokenLoginResponse {
    fn error_text(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// [`AuthGateway`] backed by the session backend's JSON endpoint.
pub struct HttpAuthGateway {
    client: Client,
    settings: AuthGatewaySettings,
}

impl HttpAuthGateway {
    pub fn new(settings: AuthGatewaySettings) -> Result<Self, BridgeError> {
        let mut builder = Client::builder();
        if let Some(timeout_ms) = settings.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        let client = builder.build().map_err(|e| {
            BridgeError::InvalidConfiguration(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { client, settings })
    }

    pub fn token_login_url(&self) -> String {
        format!(
            "{}{}",
            self.settings.url.trim_end_matches('/'),
            self.settings.token_login_path
        )
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn exchange_token(
        &self,
        token: &Secret<String>,
        user_id: &str,
    ) -> Result<String, ExchangeError> {
        let url = self.token_login_url();

        let response = self
            .client
            .traced_post(&url)
            .json(&TokenLoginRequest {
                token: token.expose_secret(),
                user_id,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                ExchangeError::from(e)
            })?;

        let status = response.status();
        let text = response.text().await?;
        let body = serde_json::from_str::<TokenLoginResponse>(&text);

        if !status.is_success() {
            return Err(ExchangeError::Status {
                status: status.as_u16(),
                error: body.ok().and_then(|b| b.error_text()),
            });
        }

        let body = body.map_err(|e| ExchangeError::MalformedResponse(e.to_string()))?;

        match body.message.as_deref() {
            Some(message) if !message.is_empty() => Ok(message.to_string()),
            _ if body.error.is_some() => Err(ExchangeError::Rejected {
                error: body.error_text(),
            }),
            _ => Err(ExchangeError::MalformedResponse(
                "response carries neither message nor error".to_string(),
            )),
        }
    }
}
