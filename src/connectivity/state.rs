//! Reachability state snapshot.
//!
//! # State Transitions
//! ```text
//! Reachable → Unreachable: probe or platform signal reports down
//! Unreachable → Reachable: probe or platform signal reports up
//! ```
//!
//! Every applied observation produces a fresh immutable snapshot with the
//! next version. Only a change of `reachable` counts as a transition.

use std::fmt;
use std::time::Instant;

/// Where an observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReachabilitySource {
    /// Configured starting value, nothing observed yet.
    Initial,
    /// An active probe.
    Probe,
    /// The platform push signal.
    Platform,
}

impl fmt::Display for ReachabilitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReachabilitySource::Initial => write!(f, "initial"),
            ReachabilitySource::Probe => write!(f, "probe"),
            ReachabilitySource::Platform => write!(f, "platform"),
        }
    }
}

/// Immutable view of the network's reachability at one version.
#[derive(Debug, Clone)]
pub struct ReachabilityState {
    pub reachable: bool,
    /// Increases by one with every applied observation.
    pub version: u64,
    pub source: ReachabilitySource,
    pub observed_at: Instant,
}

impl ReachabilityState {
    pub fn initial(reachable: bool) -> Self {
        Self {
            reachable,
            version: 0,
            source: ReachabilitySource::Initial,
            observed_at: Instant::now(),
        }
    }

    /// Successor snapshot for a new observation.
    pub fn next(&self, reachable: bool, source: ReachabilitySource) -> Self {
        Self {
            reachable,
            version: self.version + 1,
            source,
            observed_at: Instant::now(),
        }
    }
}

/// Notification sent to observers when reachability flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReachabilityChange {
    pub reachable: bool,
    pub version: u64,
    pub source: ReachabilitySource,
}
