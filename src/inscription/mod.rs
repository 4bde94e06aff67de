//! Inscription feature: the transfer pipeline and the loop that drives it.
//!
//! # Data Flow
//! ```text
//! Runner (times × delay)
//!     → Token::balance_of (log only)
//!     → Token::inscribe = Token::transfer(value 0, to self, data)
//!         → build → nonce → sign → broadcast
//! ```

pub mod runner;
pub mod token;

pub use runner::{RunSummary, Runner};
pub use token::{NoncePolicy, Token, TransferOutcome};
