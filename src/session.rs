//! Wallet session — connection status, account, and active network.
//!
//! The flows consume this read-only to gate the commit step; only the
//! connect/disconnect calls (driven by the wallet UI) mutate it.

use serde::Serialize;
use tokio::sync::RwLock;

use crate::gateway::types::Address;

/// Point-in-time view of the session, safe to hand across an await.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

/// Shared wallet session state.
#[derive(Debug, Default)]
pub struct WalletSession {
    inner: RwLock<SessionSnapshot>,
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connected account on the given chain.
    pub async fn connect(&self, account: Address, chain_id: u64) {
        let mut inner = self.inner.write().await;
        tracing::info!(account = %account, chain_id, "Wallet connected");
        *inner = SessionSnapshot {
            connected: true,
            account: Some(account),
            chain_id: Some(chain_id),
        };
    }

    /// Drop the current account, if any.
    pub async fn disconnect(&self) {
        let mut inner = self.inner.write().await;
        if inner.connected {
            tracing::info!("Wallet disconnected");
        }
        *inner = SessionSnapshot::default();
    }

    pub async fn is_connected(&self) -> bool {
        self.inner.read().await.connected
    }

    /// The connected account, if any.
    pub async fn account(&self) -> Option<Address> {
        self.inner.read().await.account.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.read().await.clone()
    }
}
