use super::MessageRouter;
use crate::error::BridgeError;
use crate::models::{AuthEventPayload, ParentNotification, SessionOutcome};

/// Lifecycle of one `auth` message.
///
/// Single-shot: every message starts in `Idle` and ends in `Confirmed` or
/// `Failed`. A failed exchange is never retried here; the partner re-posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Idle,
    Exchanging,
    Confirmed,
    Failed,
}

impl AuthState {
    pub fn can_advance_to(self, next: AuthState) -> bool {
        use AuthState::*;
        matches!(
            (self, next),
            (Idle, Exchanging) | (Idle, Failed) | (Exchanging, Confirmed) | (Exchanging, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AuthState::Confirmed | AuthState::Failed)
    }

    fn advance(self, next: AuthState) -> AuthState {
        debug_assert!(
            self.can_advance_to(next),
            "invalid auth transition {:?} -> {:?}",
            self,
            next
        );
        tracing::debug!(from = ?self, to = ?next, "Auth handshake transition");
        next
    }
}

impl SessionOutcome {
    /// Terminal handshake state this outcome corresponds to.
    pub fn state(&self) -> AuthState {
        match self {
            SessionOutcome::Confirmed { .. } => AuthState::Confirmed,
            SessionOutcome::Failed(_) => AuthState::Failed,
        }
    }
}

impl MessageRouter {
    pub(super) async fn handle_auth(&self, payload: &AuthEventPayload) -> SessionOutcome {
        let state = AuthState::Idle;
        let (state, outcome) = self.run_handshake(state, payload).await;

        debug_assert!(state.is_terminal());
        debug_assert_eq!(state, outcome.state());
        outcome
    }

    async fn run_handshake(
        &self,
        state: AuthState,
        payload: &AuthEventPayload,
    ) -> (AuthState, SessionOutcome) {
        let Some((token, user_id)) = payload.credentials() else {
            let state = state.advance(AuthState::Failed);
            let err = BridgeError::MissingCredentials;
            tracing::warn!(
                state = ?state,
                reason = err.kind(),
                "Auth event without access_token or id"
            );
            return (state, SessionOutcome::Failed(err));
        };

        let state = state.advance(AuthState::Exchanging);

        match self.gateway.exchange_token(token, user_id).await {
            Ok(message) => {
                let state = state.advance(AuthState::Confirmed);
                tracing::info!(
                    state = ?state,
                    user_id = %user_id,
                    message = %message,
                    "Login successful"
                );

                self.notifier.notify_parent(
                    &ParentNotification::auth_successful(),
                    ParentNotification::TARGET_ORIGIN,
                );

                let delay = self.config.confirmation_delay;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                self.navigator.navigate(&self.config.routes.landing);

                (state, SessionOutcome::Confirmed { message })
            }
            Err(err) => {
                let state = state.advance(AuthState::Failed);
                tracing::error!(
                    state = ?state,
                    user_id = %user_id,
                    diagnostic = err.diagnostic().unwrap_or("none"),
                    error = %err,
                    "Login failed"
                );
                (state, SessionOutcome::Failed(BridgeError::ExchangeFailed(err)))
            }
        }
    }
}
