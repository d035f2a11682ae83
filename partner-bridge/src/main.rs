use dotenvy::dotenv;
use partner_bridge::config::get_configuration;
use partner_bridge::listener::MessageListener;
use partner_bridge::router::{MessageRouter, RouterConfig};
use partner_bridge::services::{metrics::init_metrics, HttpAuthGateway, PageChannel};
use partner_bridge::startup::build_router;
use partner_bridge::telemetry::init_tracing;
use partner_bridge::trust::OriginTrustPolicy;
use partner_bridge::AppState;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing("partner-bridge", &configuration.telemetry)?;

    init_metrics().map_err(|e| anyhow::anyhow!("Failed to register metrics: {}", e))?;

    let policy = OriginTrustPolicy::from_settings(&configuration.trust)?;
    let gateway = Arc::new(HttpAuthGateway::new(configuration.auth_gateway.clone())?);
    let page = PageChannel::new(configuration.router.page_channel_capacity);

    let router = Arc::new(MessageRouter::new(
        policy,
        gateway,
        Arc::new(page.clone()),
        Arc::new(page.clone()),
        RouterConfig::from_settings(&configuration.routes, &configuration.router),
    ));

    info!(
        handles_auth = configuration.router.handles_auth,
        handles_auth_redirect = configuration.router.handles_auth_redirect,
        confirmation_delay_ms = configuration.router.confirmation_delay_ms,
        "Message router configured"
    );

    let (listener, _listener_task) =
        MessageListener::spawn(router, configuration.router.queue_capacity);

    let app = build_router(AppState::new(listener, page));

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let tcp_listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting partner-bridge on {}", address);
    axum::serve(tcp_listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
