//! Endpoint-keyed registry of chain proxies.
//!
//! Each endpoint gets its own initialization cell, so concurrent first use of one URL dials
//! exactly once while other URLs proceed independently. A failed dial leaves the cell empty and
//! the next caller tries again.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::blockchain::client::ChainProxy;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

type ProxyCell = Arc<OnceCell<Arc<ChainProxy>>>;

/// Shared cache of connected proxies, keyed by exact endpoint string.
#[derive(Clone, Default)]
pub struct ProxyRegistry {
    inner: Arc<DashMap<String, ProxyCell>>,
}

impl ProxyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached proxy for `endpoint`, dialing it on first use.
    pub async fn get_or_create(
        &self,
        endpoint: &str,
        timeout_secs: i64,
    ) -> BlockchainResult<Arc<ChainProxy>> {
        self.get_or_create_with(endpoint, || ChainProxy::connect(endpoint, timeout_secs))
            .await
    }

    /// Like [`get_or_create`](Self::get_or_create) with a caller-supplied dial.
    pub async fn get_or_create_with<F, Fut>(
        &self,
        endpoint: &str,
        connect: F,
    ) -> BlockchainResult<Arc<ChainProxy>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = BlockchainResult<ChainProxy>>,
    {
        if endpoint.is_empty() {
            return Err(BlockchainError::EmptyEndpoint);
        }

        // The shard lock is released before dialing; only the cell serializes the dial.
        let cell = self.inner.entry(endpoint.to_string()).or_default().clone();

        let result = cell
            .get_or_try_init(|| async move {
                tracing::debug!(rpc_url = %endpoint, "Dialing new chain proxy");
                connect().await.map(Arc::new)
            })
            .await
            .cloned();

        if result.is_err() {
            self.inner.remove_if(endpoint, |_, cell| !cell.initialized());
        }
        result
    }

    /// Cached proxy without dialing.
    pub fn get(&self, endpoint: &str) -> Option<Arc<ChainProxy>> {
        self.inner
            .get(endpoint)
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of connected endpoints.
    pub fn len(&self) -> usize {
        self.inner.iter().filter(|r| r.value().initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ProxyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyRegistry")
            .field("connected", &self.len())
            .finish()
    }
}
