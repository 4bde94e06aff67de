//! Chain-specific types and error definitions.

use std::fmt;

use thiserror::Error;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// String-typed transaction field, named the way callers spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxField {
    Nonce,
    GasPrice,
    GasLimit,
    Value,
    MaxPriorityFeePerGas,
}

impl TxField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxField::Nonce => "nonce",
            TxField::GasPrice => "gasPrice",
            TxField::GasLimit => "gasLimit",
            TxField::Value => "value",
            TxField::MaxPriorityFeePerGas => "maxPriorityFeePerGas",
        }
    }
}

impl fmt::Display for TxField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcFailure {
    /// The node answered with an error, or the transport failed.
    #[error("{method} failed: {message}")]
    Remote { method: &'static str, message: String },

    /// The call did not complete within the proxy timeout.
    #[error("{method} timed out after {secs} seconds")]
    Timeout { method: &'static str, secs: u64 },
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// Malformed hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Private key is not a valid secp256k1 scalar.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Address is not `0x` followed by 40 hex characters.
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    /// A numeric transaction field could not be parsed.
    #[error("invalid {0}")]
    InvalidField(TxField),

    /// Transaction data is not valid hex.
    #[error("invalid data string: {0}")]
    InvalidData(String),

    /// A required transfer parameter is empty.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// Registry lookup without an endpoint.
    #[error("rpc url can't be empty")]
    EmptyEndpoint,

    /// Dialing the endpoint or fetching its chain id failed.
    #[error("connection to {endpoint} failed: {reason}")]
    Connection { endpoint: String, reason: String },

    /// RPC request failed or timed out.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcFailure),

    /// Broadcast called without a signed transaction.
    #[error("signed transaction can't be empty")]
    EmptyTransaction,

    /// Signing called without a key or a transaction.
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    /// The signer rejected the signing hash.
    #[error("signing failed: {0}")]
    Signing(String),
}

impl BlockchainError {
    /// True for RPC failures caused by the proxy timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BlockchainError::Rpc(RpcFailure::Timeout { .. }))
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;
