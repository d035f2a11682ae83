use crate::error::BridgeError;
use crate::models::InboundMessage;
use crate::router::MessageRouter;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The page's single subscription to partner messages.
///
/// Messages are admitted strictly in delivery order. Dispatch then runs as its
/// own task, so a slow token exchange does not hold up later messages and
/// overlapping `auth` completions may interleave (last navigation wins).
#[derive(Clone)]
pub struct MessageListener {
    sender: mpsc::Sender<InboundMessage>,
}

impl MessageListener {
    pub fn spawn(router: Arc<MessageRouter>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run(router, receiver));
        (Self { sender }, handle)
    }

    /// Queue a message for handling. Fails only once the listener task is gone.
    pub async fn deliver(&self, event: InboundMessage) -> Result<(), BridgeError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| BridgeError::ListenerClosed)
    }
}

async fn run(router: Arc<MessageRouter>, mut receiver: mpsc::Receiver<InboundMessage>) {
    tracing::info!("Message listener started");

    while let Some(event) = receiver.recv().await {
        let Ok(payload) = router.admit(&event) else {
            continue;
        };

        let router = router.clone();
        tokio::spawn(async move {
            router.dispatch(payload).await;
        });
    }

    tracing::info!("Message listener stopped");
}
