//! Inscription sender for Ethereum-compatible chains.

pub mod blockchain;
pub mod config;
pub mod inscription;
pub mod observability;

pub use blockchain::{BlockchainError, ProxyRegistry};
pub use config::InscriberConfig;
pub use inscription::{Runner, Token};
