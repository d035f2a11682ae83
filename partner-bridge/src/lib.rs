//! partner-bridge: origin-checked partner messaging for embedded pages.
pub mod config;
pub mod error;
pub mod handlers;
pub mod listener;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;
pub mod startup;
pub mod telemetry;
pub mod trust;

use listener::MessageListener;
use services::PageChannel;

/// Shared application state for the HTTP surface
#[derive(Clone)]
pub struct AppState {
    pub listener: MessageListener,
    pub page: PageChannel,
}

impl AppState {
    pub fn new(listener: MessageListener, page: PageChannel) -> Self {
        Self { listener, page }
    }
}
