//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger → monitor tasks exit their loops
//!             → in-flight requests observe cancellation
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl+C) → Trigger shutdown
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
