use crate::error::BridgeError;
use serde::{Deserialize, Serialize};

/// Result of handling one `auth` event.
#[derive(Debug)]
pub enum SessionOutcome {
    /// Backend established a session; carries its human-readable message.
    Confirmed { message: String },
    /// No session. Either `MissingCredentials` or `ExchangeFailed`.
    Failed(BridgeError),
}

impl SessionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SessionOutcome::Confirmed { .. })
    }
}

/// Acknowledgement posted to the embedding window after a confirmed login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentNotification {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: String,
}

impl ParentNotification {
    /// Target origin for the acknowledgement: a liveness signal, not a secret.
    pub const TARGET_ORIGIN: &'static str = "*";

    pub fn auth_successful() -> Self {
        Self {
            kind: "auth".to_string(),
            data: "successful".to_string(),
        }
    }
}

/// Observable page side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PageCommand {
    Navigate {
        route: String,
    },
    NotifyParent {
        message: ParentNotification,
        target_origin: String,
    },
}

impl PageCommand {
    /// Event name used on the page event stream.
    pub fn event_name(&self) -> &'static str {
        match self {
            PageCommand::Navigate { .. } => "navigate",
            PageCommand::NotifyParent { .. } => "notify_parent",
        }
    }
}

/// Which branch handled an admitted message.
#[derive(Debug)]
pub enum DispatchOutcome {
    Authenticated(SessionOutcome),
    Redirected { route: String },
    LoggedOut { route: String },
    /// Branch disabled for this embedding (e.g. `auth` on a logout-only widget).
    Ignored { event_type: String },
    Unrecognized { event_type: Option<String> },
}

impl DispatchOutcome {
    /// Stable label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Authenticated(SessionOutcome::Confirmed { .. }) => "auth_confirmed",
            DispatchOutcome::Authenticated(SessionOutcome::Failed(err)) => err.kind(),
            DispatchOutcome::Redirected { .. } => "auth_redirect",
            DispatchOutcome::LoggedOut { .. } => "logout",
            DispatchOutcome::Ignored { .. } => "ignored",
            DispatchOutcome::Unrecognized { .. } => "unknown_event_type",
        }
    }
}
