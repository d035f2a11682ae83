use crate::models::{PageCommand, ParentNotification};
use tokio::sync::broadcast;

/// Changes the current page location.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Posts a message to the window embedding this page.
pub trait Notifier: Send + Sync {
    fn notify_parent(&self, message: &ParentNotification, target_origin: &str);
}

/// Navigator and Notifier that publish [`PageCommand`]s to the host shell.
///
/// Commands are fire-and-forget: with no subscriber attached they are dropped,
/// which matches a page that has already gone away.
#[derive(Clone)]
pub struct PageChannel {
    sender: broadcast::Sender<PageCommand>,
}

impl PageChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PageCommand> {
        self.sender.subscribe()
    }

    fn publish(&self, command: PageCommand) {
        let name = command.event_name();
        if self.sender.send(command).is_err() {
            tracing::debug!(command = name, "No page attached, dropping command");
        }
    }
}

impl Navigator for PageChannel {
    fn navigate(&self, route: &str) {
        tracing::info!(route = %route, "Navigating page");
        self.publish(PageCommand::Navigate {
            route: route.to_string(),
        });
    }
}

impl Notifier for PageChannel {
    fn notify_parent(&self, message: &ParentNotification, target_origin: &str) {
        self.publish(PageCommand::NotifyParent {
            message: message.clone(),
            target_origin: target_origin.to_string(),
        });
    }
}
