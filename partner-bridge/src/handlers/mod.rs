pub mod app;
pub mod events;
pub mod messages;
pub mod metrics;
