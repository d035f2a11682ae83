pub mod auth_gateway;
pub mod metrics;
pub mod page;

pub use auth_gateway::{AuthGateway, HttpAuthGateway};
pub use page::{Navigator, Notifier, PageChannel};
