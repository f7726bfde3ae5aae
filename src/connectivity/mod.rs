//! Connectivity subsystem.
//!
//! # Data Flow
//! ```text
//! Platform push signal ──┐
//!                        ├─▶ monitor.rs ─▶ oracle.rs ─▶ state.rs snapshot
//! Periodic probe tick ───┘                    │
//!                                             ├─▶ subscribers (transitions only)
//! Pipeline reprobe ─▶ probe.rs ───────────────┘
//! ```
//!
//! # Design Decisions
//! - The oracle is passed explicitly; there is no global instance
//! - Pipelines only read state or ask the oracle to probe, never write it
//! - Reads are lock-free snapshots

pub mod monitor;
pub mod oracle;
pub mod probe;
pub mod state;

pub use monitor::{ConnectivityMonitor, MonitorHandle};
pub use oracle::{ConnectivityOracle, ReachabilitySubscription};
pub use probe::{build_probe, FallbackProbe, HttpProbe, ProbeError, ReachabilityProbe, StaticProbe};
pub use state::{ReachabilityChange, ReachabilitySource, ReachabilityState};
