//! Native token feature: balance, gas estimate, transfer and inscribe.

use std::sync::Arc;

use alloy::primitives::{Bytes, TxHash};
use serde::{Deserialize, Serialize};

use crate::blockchain::account::{parse_address, signer_from_hex};
use crate::blockchain::client::{CallParameters, ChainProxy};
use crate::blockchain::signer;
use crate::blockchain::transaction::{self, parse_fee, parse_uint};
use crate::blockchain::types::{BlockchainError, BlockchainResult, TxField};
use crate::observability::metrics;

/// What to do when the pending nonce lookup fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoncePolicy {
    /// Sign with nonce 0 and carry on. May produce a stuck or duplicate transaction when the
    /// real nonce is not zero.
    #[default]
    FallbackZero,
    /// Abort the transfer with the lookup error.
    FailClosed,
}

/// Result of a transfer that got as far as signing.
///
/// The hash is known before submission, so it is reported even when the broadcast failed.
#[derive(Debug)]
pub struct TransferOutcome {
    pub hash: TxHash,
    pub nonce: u64,
    pub broadcast: BlockchainResult<()>,
}

impl TransferOutcome {
    pub fn is_broadcast(&self) -> bool {
        self.broadcast.is_ok()
    }

    /// The hash if the node accepted the transaction.
    pub fn into_result(self) -> BlockchainResult<TxHash> {
        let hash = self.hash;
        self.broadcast.map(|()| hash)
    }
}

/// Native token operations over one chain proxy.
#[derive(Debug, Clone)]
pub struct Token {
    proxy: Arc<ChainProxy>,
    nonce_policy: NoncePolicy,
}

impl Token {
    pub fn new(proxy: Arc<ChainProxy>, nonce_policy: NoncePolicy) -> Self {
        Self {
            proxy,
            nonce_policy,
        }
    }

    pub fn proxy(&self) -> &ChainProxy {
        &self.proxy
    }

    /// Balance of `address` in wei, as a decimal string.
    pub async fn balance_of(&self, address: &str) -> BlockchainResult<String> {
        let address = parse_address(address)?;
        let balance = self.proxy.balance(address).await?;
        Ok(balance.to_string())
    }

    /// Gas limit estimate for a prospective transfer, as a decimal string.
    pub async fn estimate_gas_limit(
        &self,
        from: &str,
        to: &str,
        gas_price: &str,
        value: &str,
        data: Option<&[u8]>,
    ) -> BlockchainResult<String> {
        let params = CallParameters {
            from: parse_address(from)?,
            to: if to.is_empty() {
                None
            } else {
                Some(parse_address(to)?)
            },
            gas_limit: 0,
            gas_price: parse_fee(gas_price, TxField::GasPrice)?,
            value: parse_uint(value, TxField::Value)?,
            data: data.map(Bytes::copy_from_slice).unwrap_or_default(),
        };

        self.proxy.estimate_gas_limit(params).await
    }

    /// Build, sign and broadcast a transfer.
    ///
    /// Errors before signing are returned as `Err`. Once signed, the outcome carries the hash and
    /// the broadcast result separately.
    #[allow(clippy::too_many_arguments)]
    pub async fn transfer(
        &self,
        private_key: &str,
        gas_price: &str,
        gas_limit: &str,
        max_priority_fee_per_gas: &str,
        value: &str,
        to: &str,
        data: &str,
    ) -> BlockchainResult<TransferOutcome> {
        let prepared = self
            .prepare(private_key, gas_price, gas_limit, max_priority_fee_per_gas, value, to, data)
            .await;

        let (signed, nonce) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                metrics::record_transfer("invalid");
                return Err(e);
            }
        };

        let broadcast = self.proxy.broadcast(Some(&signed)).await;
        match &broadcast {
            Ok(()) => {
                metrics::record_transfer("broadcast");
                tracing::info!(tx_hash = %signed.hash(), nonce, "Transfer broadcast");
            }
            Err(e) => {
                metrics::record_transfer("rejected");
                tracing::warn!(tx_hash = %signed.hash(), nonce, error = %e, "Transfer broadcast failed");
            }
        }

        Ok(TransferOutcome {
            hash: signed.hash(),
            nonce,
            broadcast,
        })
    }

    /// Zero-value self-transfer carrying `data` as payload.
    ///
    /// A non-zero `max_priority_fee_per_gas` sends a dynamic fee transaction capped at `gas_price`.
    pub async fn inscribe(
        &self,
        private_key: &str,
        data: &str,
        gas_price: &str,
        gas_limit: &str,
        max_priority_fee_per_gas: &str,
    ) -> BlockchainResult<TransferOutcome> {
        let sender = signer_from_hex(private_key)?.address().to_checksum(None);
        self.transfer(
            private_key,
            gas_price,
            gas_limit,
            max_priority_fee_per_gas,
            "0",
            &sender,
            data,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn prepare(
        &self,
        private_key: &str,
        gas_price: &str,
        gas_limit: &str,
        max_priority_fee_per_gas: &str,
        value: &str,
        to: &str,
        data: &str,
    ) -> BlockchainResult<(signer::SignedTransaction, u64)> {
        let missing: Vec<&str> = [
            ("gasPrice", gas_price),
            ("gasLimit", gas_limit),
            ("to", to),
            ("value", value),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(name, _)| name)
        .collect();
        if !missing.is_empty() {
            return Err(BlockchainError::InvalidParams(format!(
                "empty {}",
                missing.join(", ")
            )));
        }

        let mut tx = transaction::build(
            "",
            gas_price,
            gas_limit,
            max_priority_fee_per_gas,
            to,
            value,
            data,
        )?;

        let key = signer_from_hex(private_key)?;
        let sender = key.address();

        parse_address(to)?;

        if tx.nonce() == 0 {
            let nonce = match self.proxy.nonce(sender).await {
                Ok(nonce) => nonce,
                Err(e) => match self.nonce_policy {
                    NoncePolicy::FallbackZero => {
                        metrics::record_nonce_fallback();
                        tracing::warn!(
                            address = %sender,
                            error = %e,
                            "Nonce lookup failed, signing with nonce 0"
                        );
                        0
                    }
                    NoncePolicy::FailClosed => return Err(e),
                },
            };
            tx.set_nonce(nonce);
        }

        let nonce = tx.nonce();
        let signed = signer::sign(Some(&key), Some(tx), self.proxy.chain_id())?;
        Ok((signed, nonce))
    }
}
