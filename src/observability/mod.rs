//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline and oracle produce:
//!     → logging.rs (structured log events, request-id spans)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Observation never changes a retry decision
//! - Metrics are cheap (atomic increments) and no-ops without a recorder

pub mod logging;
pub mod metrics;
