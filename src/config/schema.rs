//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::blockchain::codec::text_to_hex;
use crate::inscription::token::NoncePolicy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct InscriberConfig {
    /// Chain endpoint settings.
    pub rpc: RpcConfig,

    /// What to inscribe and how often.
    pub inscription: InscriptionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Chain endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,

    /// Per-call timeout in seconds; zero or below means 60.
    pub timeout_secs: i64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8545".to_string(),
            timeout_secs: 3,
        }
    }
}

/// Inscription loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InscriptionConfig {
    /// Plain text payload, hex-encoded before sending. Ignored when `data` is set.
    pub text: Option<String>,

    /// Raw hex payload.
    pub data: Option<String>,

    /// Gas price (or fee cap) in wei, decimal.
    pub gas_price: String,

    /// Gas limit, decimal. Empty means estimate.
    pub gas_limit: String,

    /// Priority fee in wei; non-zero switches to EIP-1559 transactions.
    pub max_priority_fee_per_gas: String,

    /// Number of inscriptions to send.
    pub times: u32,

    /// Delay before each attempt in seconds.
    pub delay_secs: u64,

    /// Behavior when the nonce lookup fails.
    pub nonce_policy: NoncePolicy,
}

impl InscriptionConfig {
    /// Hex payload: `data` if set, otherwise the encoded `text`.
    pub fn payload_hex(&self) -> Option<String> {
        match (&self.data, &self.text) {
            (Some(data), _) if !data.is_empty() => Some(data.clone()),
            (_, Some(text)) if !text.is_empty() => Some(text_to_hex(text)),
            _ => None,
        }
    }
}

impl Default for InscriptionConfig {
    fn default() -> Self {
        Self {
            text: None,
            data: None,
            gas_price: "30000000000".to_string(), // 30 gwei
            gas_limit: String::new(),
            max_priority_fee_per_gas: String::new(),
            times: 10,
            delay_secs: 1,
            nonce_policy: NoncePolicy::default(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InscriberConfig::default();
        assert_eq!(config.rpc.url, "http://localhost:8545");
        assert_eq!(config.inscription.times, 10);
        assert_eq!(config.inscription.delay_secs, 1);
        assert_eq!(config.inscription.nonce_policy, NoncePolicy::FallbackZero);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn test_minimal_toml() {
        let config: InscriberConfig = toml::from_str(
            r#"
            [rpc]
            url = "https://rpc.sepolia.org"

            [inscription]
            text = "hello"
            times = 3
            nonce_policy = "fail_closed"
            "#,
        )
        .unwrap();

        assert_eq!(config.rpc.url, "https://rpc.sepolia.org");
        assert_eq!(config.rpc.timeout_secs, 3);
        assert_eq!(config.inscription.times, 3);
        assert_eq!(config.inscription.gas_price, "30000000000");
        assert_eq!(config.inscription.nonce_policy, NoncePolicy::FailClosed);
    }

    #[test]
    fn test_payload_prefers_data() {
        let mut inscription = InscriptionConfig {
            text: Some("hi".to_string()),
            ..Default::default()
        };
        assert_eq!(inscription.payload_hex().as_deref(), Some("0x6869"));

        inscription.data = Some("0xdead".to_string());
        assert_eq!(inscription.payload_hex().as_deref(), Some("0xdead"));

        let empty = InscriptionConfig::default();
        assert_eq!(empty.payload_hex(), None);
    }
}
