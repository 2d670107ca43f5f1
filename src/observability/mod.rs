//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Clients and caches produce:
//!     → tracing events (retry warnings, token refreshes, fallback)
//!     → metrics.rs (counters via the metrics facade)
//!
//! Consumers:
//!     → whatever subscriber/recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or metrics recorder
//! - Counters are cheap and unconditional; they no-op without a recorder

pub mod metrics;
