//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request from caller:
//!     → pipeline.rs (pre-flight check against the connectivity oracle)
//!     → timeouts.rs (deadline on each send)
//!     → classify.rs (Success / Transient / Permanent)
//!     → retries.rs + backoff.rs (attempt budget, delay before next send)
//!     → reprobe connectivity, loop or return
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every send has a deadline
//! - Only transient network failures are retried
//! - A confirmed connectivity loss ends the call instead of spending retries
//! - Cancellation is checked at every suspension point

pub mod backoff;
pub mod classify;
pub mod pipeline;
pub mod retries;
pub mod timeouts;

pub use classify::{classify, FailureCause, Outcome};
pub use pipeline::ResilientPipeline;
pub use retries::RetryContext;
