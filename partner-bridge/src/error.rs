use thiserror::Error;

/// Every way an inbound message can fail to produce a side effect.
///
/// None of these leave the message router: they are classified, logged and
/// absorbed so the embedding page never observes a failure.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Untrusted origin: {origin}")]
    UntrustedOrigin { origin: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Missing credentials: access_token and id are required")]
    MissingCredentials,

    #[error("Token exchange failed: {0}")]
    ExchangeFailed(#[from] ExchangeError),

    #[error("Unknown event type: {}", .0.as_deref().unwrap_or("<missing>"))]
    UnknownEventType(Option<String>),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Message listener is closed")]
    ListenerClosed,
}

impl BridgeError {
    /// Stable label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::UntrustedOrigin { .. } => "untrusted_origin",
            BridgeError::MalformedPayload(_) => "malformed_payload",
            BridgeError::MissingCredentials => "missing_credentials",
            BridgeError::ExchangeFailed(_) => "exchange_failed",
            BridgeError::UnknownEventType(_) => "unknown_event_type",
            BridgeError::InvalidConfiguration(_) => "invalid_configuration",
            BridgeError::ListenerClosed => "listener_closed",
        }
    }
}

/// Failure of the backend token exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Backend answered with an `error` body.
    #[error("rejected by backend: {}", .error.as_deref().unwrap_or("no diagnostic"))]
    Rejected { error: Option<String> },

    #[error("backend returned status {status}: {}", .error.as_deref().unwrap_or("no diagnostic"))]
    Status { status: u16, error: Option<String> },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ExchangeError {
    /// Human-readable diagnostic supplied by the backend, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            ExchangeError::Rejected { error } | ExchangeError::Status { error, .. } => {
                error.as_deref()
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ExchangeError::MalformedResponse(err.to_string())
        } else {
            ExchangeError::Transport(err.to_string())
        }
    }
}
