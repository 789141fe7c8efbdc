//! Issuance notifications.
//!
//! External observers (audit trails, webhook fan-out) register listeners
//! for token issuance. Dispatch is fire-and-forget: a failing listener is
//! logged and never blocks a grant.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;

/// Payload describing a newly persisted access token.
#[derive(Debug, Clone)]
pub struct AccessTokenCreated {
    /// The grant engine's token id.
    pub token_id: String,
    /// Raw owner payload exactly as it crossed the engine's user-identifier
    /// channel.
    pub user_identifier: String,
    pub client_id: String,
}

/// Listener for issuance events.
#[async_trait]
pub trait TokenEventListener: Send + Sync {
    async fn access_token_created(&self, event: &AccessTokenCreated) -> Result<()>;

    /// Listener identifier for logging.
    fn name(&self) -> &str;
}

/// Registered listeners, notified in registration order.
#[derive(Clone, Default)]
pub struct TokenEvents {
    listeners: Arc<Vec<Arc<dyn TokenEventListener>>>,
}

impl TokenEvents {
    pub fn new(listeners: Vec<Arc<dyn TokenEventListener>>) -> Self {
        Self {
            listeners: Arc::new(listeners),
        }
    }

    /// No listeners (no-op dispatch).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Notify every listener of a persisted token.
    pub async fn access_token_created(&self, event: &AccessTokenCreated) {
        for listener in self.listeners.iter() {
            if let Err(e) = listener.access_token_created(event).await {
                warn!(
                    listener = listener.name(),
                    token_id = %event.token_id,
                    "token event listener failed: {e}"
                );
            }
        }
    }
}
