//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! string fields (gas price, value, data, ...)
//!     → transaction.rs (parse & validate, pick legacy or dynamic fee shape)
//!     → client.rs (pending nonce lookup)
//!     → signer.rs (chain-bound signature + hash)
//!     → client.rs (eth_sendRawTransaction)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod account;
pub mod client;
pub mod codec;
pub mod registry;
pub mod signer;
pub mod transaction;
pub mod types;

pub use account::Account;
pub use client::{CallParameters, ChainProxy};
pub use registry::ProxyRegistry;
pub use signer::SignedTransaction;
pub use transaction::UnsignedTransaction;
pub use types::{BlockchainError, BlockchainResult, ChainId, RpcFailure, TxField};
