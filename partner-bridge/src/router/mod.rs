//! Validation and dispatch of partner messages.
//!
//! Every inbound message goes through [`MessageRouter::admit`] (origin check,
//! body parsing) and then [`MessageRouter::dispatch`] (one handler per event
//! type). Failures are logged and counted here and never reach the caller.

mod auth;

pub use auth::AuthState;

use crate::config::{RouteSettings, RouterSettings};
use crate::error::BridgeError;
use crate::models::{AuthEventPayload, DispatchOutcome, EventType, InboundMessage};
use crate::services::metrics::record_message;
use crate::services::{AuthGateway, Navigator, Notifier};
use crate::trust::OriginTrustPolicy;
use std::sync::Arc;
use std::time::Duration;

/// Which handlers are active for this embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterCapabilities {
    /// False for logout-only widgets, where the login page owns the handshake.
    pub handles_auth: bool,
    /// False for logout-only widgets, which must never jump to the dashboard.
    pub handles_auth_redirect: bool,
}

impl RouterCapabilities {
    pub fn full_page() -> Self {
        Self {
            handles_auth: true,
            handles_auth_redirect: true,
        }
    }

    pub fn logout_only() -> Self {
        Self {
            handles_auth: false,
            handles_auth_redirect: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub capabilities: RouterCapabilities,
    pub routes: RouteSettings,
    /// Pause between the parent acknowledgement and the landing navigation.
    pub confirmation_delay: Duration,
}

impl RouterConfig {
    pub fn from_settings(routes: &RouteSettings, router: &RouterSettings) -> Self {
        Self {
            capabilities: RouterCapabilities {
                handles_auth: router.handles_auth,
                handles_auth_redirect: router.handles_auth_redirect,
            },
            routes: routes.clone(),
            confirmation_delay: router.confirmation_delay(),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::from_settings(&RouteSettings::default(), &RouterSettings::default())
    }
}

pub struct MessageRouter {
    policy: OriginTrustPolicy,
    gateway: Arc<dyn AuthGateway>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    config: RouterConfig,
}

impl MessageRouter {
    pub fn new(
        policy: OriginTrustPolicy,
        gateway: Arc<dyn AuthGateway>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        config: RouterConfig,
    ) -> Self {
        Self {
            policy,
            gateway,
            navigator,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Handle one inbound message end to end. Never fails.
    pub async fn on_message(&self, event: InboundMessage) {
        let _ = self.route(event).await;
    }

    /// Admit then dispatch, reporting why a message was dropped.
    pub async fn route(&self, event: InboundMessage) -> Result<DispatchOutcome, BridgeError> {
        let payload = self.admit(&event)?;
        Ok(self.dispatch(payload).await)
    }

    /// Origin check and body parsing. Nothing is parsed for untrusted origins.
    pub fn admit(&self, event: &InboundMessage) -> Result<AuthEventPayload, BridgeError> {
        if !self.policy.is_trusted(&event.origin) {
            let err = BridgeError::UntrustedOrigin {
                origin: event.origin.clone(),
            };
            tracing::warn!(
                origin = %event.origin,
                reason = err.kind(),
                "Event received from untrusted origin, halting event"
            );
            record_message(err.kind());
            return Err(err);
        }

        tracing::debug!(origin = %event.origin, "Event received from trusted origin");

        AuthEventPayload::parse(&event.data).map_err(|err| {
            tracing::warn!(
                origin = %event.origin,
                reason = err.kind(),
                error = %err,
                "Dropping unparseable message"
            );
            record_message(err.kind());
            err
        })
    }

    /// Run the handler for the payload's event type.
    pub async fn dispatch(&self, payload: AuthEventPayload) -> DispatchOutcome {
        tracing::debug!(event_type = %payload.event_type, "Dispatching event");

        let outcome = match &payload.event_type {
            EventType::Auth if self.config.capabilities.handles_auth => {
                DispatchOutcome::Authenticated(self.handle_auth(&payload).await)
            }
            EventType::Auth => {
                tracing::debug!("Ignoring auth event, another listener owns the login handshake");
                DispatchOutcome::Ignored {
                    event_type: payload.event_type.to_string(),
                }
            }
            EventType::AuthRedirect if self.config.capabilities.handles_auth_redirect => {
                self.handle_auth_redirect()
            }
            // Without a redirect handler the event is just another unknown type
            EventType::AuthRedirect => self.handle_unknown(Some(payload.event_type.to_string())),
            EventType::Logout => self.handle_logout(),
            EventType::Unknown(value) => self.handle_unknown(value.clone()),
        };

        record_message(outcome.label());
        outcome
    }

    fn handle_auth_redirect(&self) -> DispatchOutcome {
        let route = self.config.routes.dashboard.clone();
        self.navigator.navigate(&route);
        DispatchOutcome::Redirected { route }
    }

    fn handle_logout(&self) -> DispatchOutcome {
        tracing::info!("Logging out user");
        let route = self.config.routes.logout.clone();
        self.navigator.navigate(&route);
        DispatchOutcome::LoggedOut { route }
    }

    fn handle_unknown(&self, event_type: Option<String>) -> DispatchOutcome {
        let reason = BridgeError::UnknownEventType(event_type.clone());
        tracing::info!(reason = reason.kind(), "{}, ignoring", reason);
        DispatchOutcome::Unrecognized { event_type }
    }
}
