//! Inscription loop.
//!
//! Each attempt waits the configured delay, logs the sender balance, then inscribes. A failed
//! attempt is logged and the loop moves on; there is no backoff.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;

use crate::blockchain::account::Account;
use crate::blockchain::client::{baseline_gas_limit, CallParameters};
use crate::blockchain::codec::decode_hex;
use crate::blockchain::types::BlockchainResult;
use crate::config::schema::InscriptionConfig;
use crate::inscription::token::Token;

/// Counts of attempts by result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: u32,
    pub failed: u32,
}

/// Drives repeated inscriptions for a single account.
pub struct Runner {
    token: Token,
    account: Account,
    config: InscriptionConfig,
    data: String,
}

impl Runner {
    /// `data` is the hex payload, already resolved from the config.
    pub fn new(token: Token, account: Account, config: InscriptionConfig, data: String) -> Self {
        Self {
            token,
            account,
            config,
            data,
        }
    }

    /// Run all attempts, stopping early once `shutdown` turns `true`.
    ///
    /// A dropped sender means no shutdown will ever arrive; the loop runs to completion.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> RunSummary {
        let mut summary = RunSummary::default();
        let delay = Duration::from_secs(self.config.delay_secs);

        tracing::info!(
            rpc_url = %self.token.proxy().endpoint(),
            chain_id = self.token.proxy().chain_id().0,
            address = %self.account.address,
            times = self.config.times,
            gas_price = %self.config.gas_price,
            gas_limit = %self.config.gas_limit,
            "Starting inscriptions"
        );

        for attempt in 1..=self.config.times {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown_signalled(&mut shutdown) => {
                    tracing::info!(attempt, "Shutdown requested, stopping");
                    break;
                }
            }

            match self.attempt(attempt).await {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(attempt, error = %e, "Inscription failed");
                }
            }
        }

        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "All inscriptions done"
        );
        summary
    }

    async fn attempt(&self, attempt: u32) -> BlockchainResult<()> {
        let balance = self.token.balance_of(&self.account.address).await?;
        tracing::info!(attempt, balance_wei = %balance, "Balance");

        let gas_limit = self.gas_limit().await?;
        let outcome = self
            .token
            .inscribe(
                &self.account.private_key,
                &self.data,
                &self.config.gas_price,
                &gas_limit,
                &self.config.max_priority_fee_per_gas,
            )
            .await?;

        let hash = outcome.into_result()?;
        tracing::info!(attempt, tx_hash = %hash, "Inscription sent");
        Ok(())
    }

    /// Configured gas limit, or a node estimate falling back to the fixed baseline.
    async fn gas_limit(&self) -> BlockchainResult<String> {
        if !self.config.gas_limit.is_empty() {
            return Ok(self.config.gas_limit.clone());
        }

        let data = decode_hex(&self.data)?;
        let estimate = self
            .token
            .estimate_gas_limit(
                &self.account.address,
                &self.account.address,
                &self.config.gas_price,
                "0",
                Some(&data),
            )
            .await;

        match estimate {
            Ok(gas) => Ok(gas),
            Err(e) => {
                let params = CallParameters {
                    data: data.into(),
                    ..Default::default()
                };
                let baseline = baseline_gas_limit(&params);
                tracing::warn!(error = %e, baseline, "Gas estimate failed, using baseline");
                Ok(baseline.to_string())
            }
        }
    }
}

async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
