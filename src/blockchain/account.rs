//! Account derivation from raw private keys.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use std::fmt;

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use serde::Serialize;

use crate::blockchain::codec::{decode_hex, encode_hex};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "INSCRIBER_PRIVATE_KEY";

/// Keypair identity derived once from a private key.
#[derive(Clone, Serialize)]
pub struct Account {
    /// EIP-55 checksummed address.
    pub address: String,
    #[serde(skip)]
    pub private_key: String,
    /// Uncompressed SEC1 public key, hex without prefix (starts with `04`).
    pub public_key: String,
    /// Empty when derived from a raw key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
}

impl Account {
    /// Derive an account from a hex-encoded private key (with or without `0x`).
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let signer = signer_from_hex(private_key_hex)?;
        let point = signer.credential().verifying_key().to_encoded_point(false);

        Ok(Self {
            address: signer.address().to_checksum(None),
            private_key: private_key_hex.to_string(),
            public_key: encode_hex(point.as_bytes())
                .trim_start_matches("0x")
                .to_string(),
            mnemonic: None,
        })
    }

    /// Load the account from `INSCRIBER_PRIVATE_KEY`.
    pub fn from_env() -> BlockchainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            BlockchainError::InvalidPrivateKey(format!(
                "environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Build a local signer from a hex private key.
///
/// The key must decode to exactly 32 bytes and be a non-zero scalar below the curve order.
pub fn signer_from_hex(private_key_hex: &str) -> BlockchainResult<PrivateKeySigner> {
    let bytes = decode_hex(private_key_hex)
        .map_err(|_| BlockchainError::InvalidPrivateKey("key is not valid hex".to_string()))?;

    if bytes.len() != 32 {
        return Err(BlockchainError::InvalidPrivateKey(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }

    PrivateKeySigner::from_bytes(&B256::from_slice(&bytes))
        .map_err(|e| BlockchainError::InvalidPrivateKey(e.to_string()))
}

/// Parse a strictly formatted hex address: `0x` followed by 40 hex characters, any case.
pub fn parse_address(s: &str) -> BlockchainResult<Address> {
    let invalid = || BlockchainError::InvalidAddress(s.to_string());

    let digits = s.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    digits.parse().map_err(|_| invalid())
}

/// Whether `s` passes [`parse_address`].
pub fn is_valid_address(s: &str) -> bool {
    parse_address(s).is_ok()
}
