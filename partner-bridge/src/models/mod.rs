pub mod message;
pub mod session;

pub use message::{AuthEventPayload, EventType, InboundMessage};
pub use session::{DispatchOutcome, PageCommand, ParentNotification, SessionOutcome};
