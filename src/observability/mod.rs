//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! blockchain + inscription produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (RPC and transfer counters)
//!
//! Consumers:
//!     → stdout
//!     → Prometheus scrape (when enabled)
//! ```

pub mod logging;
pub mod metrics;
