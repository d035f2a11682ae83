use crate::error::BridgeError;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A cross-document message as delivered by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Sender's scheme + host + port, as reported by the platform.
    pub origin: String,
    /// Raw message body, expected to be JSON.
    pub data: String,
}

impl InboundMessage {
    pub fn new(origin: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            data: data.into(),
        }
    }
}

/// Declared intent of a partner message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    Auth,
    AuthRedirect,
    Logout,
    /// Anything else, carrying the raw discriminator when there was one.
    Unknown(Option<String>),
}

impl EventType {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => match s.as_str() {
                "auth" => EventType::Auth,
                "auth_redirect" => EventType::AuthRedirect,
                "logout" => EventType::Logout,
                _ => EventType::Unknown(Some(s.clone())),
            },
            None | Some(Value::Null) => EventType::Unknown(None),
            Some(other) => EventType::Unknown(Some(other.to_string())),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            EventType::Auth => Some("auth"),
            EventType::AuthRedirect => Some("auth_redirect"),
            EventType::Logout => Some("logout"),
            EventType::Unknown(value) => value.as_deref(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or("<missing>"))
    }
}

/// Parsed body of a partner message.
///
/// Only built for messages whose origin already passed the trust policy.
/// Credential fields are checked by the `auth` branch, not here.
#[derive(Debug)]
pub struct AuthEventPayload {
    pub event_type: EventType,
    pub access_token: Option<Secret<String>>,
    /// Partner-side user identifier (`id` on the wire).
    pub user_id: Option<String>,
}

impl AuthEventPayload {
    pub fn parse(raw: &str) -> Result<Self, BridgeError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| BridgeError::MalformedPayload(e.to_string()))?;

        let Value::Object(mut body) = value else {
            return Err(BridgeError::MalformedPayload(
                "expected a JSON object".to_string(),
            ));
        };

        let event_type = EventType::from_value(body.get("event_type"));

        let access_token = match body.remove("access_token") {
            Some(Value::String(token)) => Some(Secret::new(token)),
            _ => None,
        };

        let user_id = match body.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        Ok(Self {
            event_type,
            access_token,
            user_id,
        })
    }

    /// Token and user id, when both are present and non-empty.
    pub fn credentials(&self) -> Option<(&Secret<String>, &str)> {
        let token = self
            .access_token
            .as_ref()
            .filter(|token| !token.expose_secret().is_empty())?;
        let user_id = self.user_id.as_deref().filter(|id| !id.is_empty())?;
        Some((token, user_id))
    }
}
