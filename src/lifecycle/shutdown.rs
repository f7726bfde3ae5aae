//! Shutdown coordination for the client.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Coordinator for graceful shutdown.
///
/// Background tasks subscribe to the broadcast channel; in-flight requests
/// hold a child cancellation token, so one trigger stops both.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    token: CancellationToken,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            token: CancellationToken::new(),
        }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Cancellation token for one request; cancelled on trigger.
    pub fn request_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.token.cancel();
        let _ = self.tx.send(());
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
