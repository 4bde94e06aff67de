//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → InscriberConfig (validated, immutable)
//!     → CLI flags override individual fields
//! ```
//!
//! The private key is never part of the file; it comes from `INSCRIBER_PRIVATE_KEY`.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{InscriberConfig, InscriptionConfig, ObservabilityConfig, RpcConfig};
