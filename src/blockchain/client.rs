//! Chain proxy: one RPC connection per endpoint.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint and cache its chain id
//! - Nonce, balance and gas lookups
//! - Broadcast signed transactions
//! - Bound every call by the configured timeout

use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use tokio::time::timeout;

use crate::blockchain::signer::SignedTransaction;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, RpcFailure};
use crate::observability::metrics;

/// Timeout used when the caller passes zero or a negative value.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Gas baseline for a plain value transfer.
pub const DEFAULT_TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Gas baseline for any call carrying payload data.
pub const DEFAULT_CONTRACT_GAS_LIMIT: u64 = 100_000;

/// Payload-bearing estimates are multiplied by `GAS_FACTOR_NUM / GAS_FACTOR_DEN` (1.3).
const GAS_FACTOR_NUM: u128 = 13;
const GAS_FACTOR_DEN: u128 = 10;

/// Parameters for `eth_estimateGas`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallParameters {
    pub from: Address,
    /// `None` estimates a contract creation.
    pub to: Option<Address>,
    /// Zero leaves the cap to the node.
    pub gas_limit: u64,
    pub gas_price: u128,
    pub value: U256,
    pub data: Bytes,
}

impl CallParameters {
    fn into_request(self) -> TransactionRequest {
        let mut request = TransactionRequest::default()
            .with_from(self.from)
            .with_value(self.value)
            .with_input(self.data);

        if let Some(to) = self.to {
            request = request.with_to(to);
        }
        if self.gas_limit > 0 {
            request = request.with_gas_limit(self.gas_limit);
        }
        if self.gas_price > 0 {
            request = request.with_gas_price(self.gas_price);
        }
        request
    }
}

/// Starting gas limit before asking the node.
pub fn baseline_gas_limit(params: &CallParameters) -> u64 {
    if params.data.is_empty() {
        DEFAULT_TRANSFER_GAS_LIMIT
    } else {
        DEFAULT_CONTRACT_GAS_LIMIT
    }
}

/// Connection handle for a single endpoint.
pub struct ChainProxy {
    endpoint: String,
    provider: Arc<dyn Provider + Send + Sync>,
    chain_id: ChainId,
    timeout_duration: Duration,
}

impl ChainProxy {
    /// Dial `endpoint` over HTTP and fetch its chain id.
    ///
    /// A `timeout_secs` of zero or below falls back to [`DEFAULT_TIMEOUT_SECS`].
    pub async fn connect(endpoint: &str, timeout_secs: i64) -> BlockchainResult<Self> {
        if endpoint.is_empty() {
            return Err(BlockchainError::EmptyEndpoint);
        }

        let url: url::Url = endpoint.parse().map_err(|e| BlockchainError::Connection {
            endpoint: endpoint.to_string(),
            reason: format!("invalid RPC URL: {}", e),
        })?;

        let provider = ProviderBuilder::new().connect_http(url);
        Self::with_provider(endpoint, provider, timeout_secs).await
    }

    /// Wrap an existing provider, fetching the chain id through it.
    pub async fn with_provider<P>(
        endpoint: &str,
        provider: P,
        timeout_secs: i64,
    ) -> BlockchainResult<Self>
    where
        P: Provider + Send + Sync + 'static,
    {
        let timeout_duration = Duration::from_secs(normalize_timeout(timeout_secs));
        let provider: Arc<dyn Provider + Send + Sync> = Arc::new(provider);

        let chain_id = match timeout(timeout_duration, provider.get_chain_id()).await {
            Ok(Ok(id)) => ChainId(id),
            Ok(Err(e)) => {
                return Err(BlockchainError::Connection {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(BlockchainError::Connection {
                    endpoint: endpoint.to_string(),
                    reason: format!(
                        "eth_chainId timed out after {} seconds",
                        timeout_duration.as_secs()
                    ),
                })
            }
        };

        tracing::info!(
            rpc_url = %endpoint,
            chain_id = chain_id.0,
            timeout_secs = timeout_duration.as_secs(),
            "Chain proxy connected"
        );

        Ok(Self {
            endpoint: endpoint.to_string(),
            provider,
            chain_id,
            timeout_duration,
        })
    }

    /// Pending transaction count for `address`.
    pub async fn nonce(&self, address: Address) -> BlockchainResult<u64> {
        self.call(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address).pending(),
        )
        .await
    }

    /// Latest balance of `address` in wei.
    pub async fn balance(&self, address: Address) -> BlockchainResult<U256> {
        self.call("eth_getBalance", self.provider.get_balance(address))
            .await
    }

    /// Estimate a gas limit, returned as a decimal string.
    ///
    /// Plain transfers use the node's estimate as is. Calls carrying data are scaled by 1.3 and
    /// truncated, since state may move between estimation and inclusion.
    pub async fn estimate_gas_limit(&self, params: CallParameters) -> BlockchainResult<String> {
        let baseline = baseline_gas_limit(&params);
        let has_data = !params.data.is_empty();

        tracing::debug!(baseline, has_data, "Estimating gas limit");

        let estimate = self
            .call(
                "eth_estimateGas",
                self.provider.estimate_gas(params.into_request()),
            )
            .await?;

        if has_data {
            let scaled = u128::from(estimate) * GAS_FACTOR_NUM / GAS_FACTOR_DEN;
            Ok(scaled.to_string())
        } else {
            Ok(estimate.to_string())
        }
    }

    /// Submit a signed transaction.
    pub async fn broadcast(&self, signed: Option<&SignedTransaction>) -> BlockchainResult<()> {
        let signed = signed.ok_or(BlockchainError::EmptyTransaction)?;
        let encoded = signed.encoded();

        self.call(
            "eth_sendRawTransaction",
            self.provider.send_raw_transaction(&encoded),
        )
        .await?;

        tracing::debug!(tx_hash = %signed.hash(), "Transaction broadcast");
        Ok(())
    }

    /// Chain id fetched at connect time.
    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_duration
    }

    async fn call<F, T, E>(&self, method: &'static str, fut: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let started = Instant::now();

        let result = match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(method, rpc_url = %self.endpoint, error = %e, "RPC error");
                Err(RpcFailure::Remote {
                    method,
                    message: e.to_string(),
                })
            }
            Err(_) => {
                tracing::warn!(method, rpc_url = %self.endpoint, "RPC timeout");
                Err(RpcFailure::Timeout {
                    method,
                    secs: self.timeout_duration.as_secs(),
                })
            }
        };

        metrics::record_rpc_call(method, result.is_ok(), started.elapsed());
        result.map_err(BlockchainError::from)
    }
}

impl fmt::Debug for ChainProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainProxy")
            .field("rpc_url", &self.endpoint)
            .field("chain_id", &self.chain_id.0)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

fn normalize_timeout(timeout_secs: i64) -> u64 {
    if timeout_secs <= 0 {
        DEFAULT_TIMEOUT_SECS
    } else {
        timeout_secs as u64
    }
}
