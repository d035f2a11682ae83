#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    http::{header, StatusCode},
    routing::post,
    Json, Router,
};
use partner_bridge::config::{AuthGatewaySettings, RouteSettings};
use partner_bridge::error::ExchangeError;
use partner_bridge::models::{PageCommand, ParentNotification};
use partner_bridge::router::{MessageRouter, RouterCapabilities, RouterConfig};
use partner_bridge::services::{metrics, AuthGateway, Navigator, Notifier};
use partner_bridge::trust::{OriginTrustPolicy, TrustedOriginSet};
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

pub const TRUSTED_ORIGIN: &str = "https://msk-superbio.com";
pub const TRUSTED_SUBDOMAIN: &str = "https://partner.msk-superbio.com";
pub const UNTRUSTED_ORIGIN: &str = "https://evil.com";

pub const AUTH_BODY: &str = r#"{"event_type":"auth","access_token":"tok123","id":"u1"}"#;

pub fn trust_policy() -> OriginTrustPolicy {
    OriginTrustPolicy::new(TrustedOriginSet {
        exact: vec![
            "https://dev.app.superbio.ai".to_string(),
            TRUSTED_ORIGIN.to_string(),
        ],
        wildcard_domains: vec!["msk-superbio.com".to_string()],
    })
    .expect("test policy is valid")
}

pub fn router_config(capabilities: RouterCapabilities, delay: Duration) -> RouterConfig {
    RouterConfig {
        capabilities,
        routes: RouteSettings::default(),
        confirmation_delay: delay,
    }
}

/// How the stub backend answers a token exchange.
pub enum Reply {
    Message(&'static str),
    Error(&'static str),
    Transport,
    /// Waits for the notify before answering with the message.
    Held(Arc<Notify>, &'static str),
}

pub struct StubGateway {
    reply: Reply,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubGateway {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthGateway for StubGateway {
    async fn exchange_token(
        &self,
        token: &Secret<String>,
        user_id: &str,
    ) -> Result<String, ExchangeError> {
        self.calls
            .lock()
            .unwrap()
            .push((token.expose_secret().clone(), user_id.to_string()));

        match &self.reply {
            Reply::Message(message) => Ok(message.to_string()),
            Reply::Error(error) => Err(ExchangeError::Rejected {
                error: Some(error.to_string()),
            }),
            Reply::Transport => Err(ExchangeError::Transport("connection refused".to_string())),
            Reply::Held(release, message) => {
                release.notified().await;
                Ok(message.to_string())
            }
        }
    }
}

/// Navigator + Notifier that records every command with the (tokio) time it happened.
#[derive(Default)]
pub struct RecordingPage {
    commands: Mutex<Vec<(Instant, PageCommand)>>,
}

impl RecordingPage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn commands(&self) -> Vec<PageCommand> {
        self.timeline().into_iter().map(|(_, c)| c).collect()
    }

    pub fn timeline(&self) -> Vec<(Instant, PageCommand)> {
        self.commands.lock().unwrap().clone()
    }

    fn push(&self, command: PageCommand) {
        self.commands.lock().unwrap().push((Instant::now(), command));
    }
}

impl Navigator for RecordingPage {
    fn navigate(&self, route: &str) {
        self.push(PageCommand::Navigate {
            route: route.to_string(),
        });
    }
}

impl Notifier for RecordingPage {
    fn notify_parent(&self, message: &ParentNotification, target_origin: &str) {
        self.push(PageCommand::NotifyParent {
            message: message.clone(),
            target_origin: target_origin.to_string(),
        });
    }
}

pub fn build_message_router(
    gateway: Arc<StubGateway>,
    page: Arc<RecordingPage>,
    config: RouterConfig,
) -> MessageRouter {
    MessageRouter::new(trust_policy(), gateway, page.clone(), page, config)
}

pub fn navigate(route: &str) -> PageCommand {
    PageCommand::Navigate {
        route: route.to_string(),
    }
}

pub fn auth_ack() -> PageCommand {
    PageCommand::NotifyParent {
        message: ParentNotification::auth_successful(),
        target_origin: "*".to_string(),
    }
}

/// Current value of `bridge_messages_total{outcome}`, registering metrics on first use.
///
/// Counters are process-wide, so tests compare before/after values.
pub fn message_count(outcome: &str) -> u64 {
    metrics::init_metrics().expect("metrics register");
    let series = format!("bridge_messages_total{{outcome=\"{}\"}} ", outcome);
    metrics::get_metrics()
        .lines()
        .find_map(|line| line.strip_prefix(series.as_str()))
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Throwaway token-login backend answering every request with a fixed status and body.
pub struct MockBackend {
    pub url: String,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl MockBackend {
    pub async fn spawn(status: StatusCode, body: &'static str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let captured = requests.clone();

        let app = Router::new().route(
            "/auth/token-login",
            post(move |Json(request): Json<Value>| {
                let captured = captured.clone();
                async move {
                    captured.lock().unwrap().push(request);
                    (status, [(header::CONTENT_TYPE, "application/json")], body)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let address = listener.local_addr().expect("mock backend has an address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            url: format!("http://{}", address),
            requests,
        }
    }

    pub fn settings(&self) -> AuthGatewaySettings {
        AuthGatewaySettings {
            url: self.url.clone(),
            token_login_path: "/auth/token-login".to_string(),
            timeout_ms: Some(5000),
        }
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}
