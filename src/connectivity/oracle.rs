//! Connectivity oracle: the single source of truth for "is the network usable".
//!
//! # Responsibilities
//! - Serve the cached reachability instantly and without locking
//! - Refresh it actively (probe) or passively (platform report)
//! - Notify observers exactly once per reachability flip
//!
//! # Design Decisions
//! - State lives in an `ArcSwap`: readers load a snapshot, writers publish
//!   state and version in one pointer swap
//! - Writers are serialized so compare-and-publish cannot double-notify
//! - Observers get a bounded broadcast queue each; a slow observer lags
//!   instead of blocking the writer

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::config::ConnectivityConfig;
use crate::connectivity::probe::ReachabilityProbe;
use crate::connectivity::state::{ReachabilityChange, ReachabilitySource, ReachabilityState};
use crate::observability::metrics;

pub struct ConnectivityOracle {
    state: ArcSwap<ReachabilityState>,
    write_lock: Mutex<()>,
    probe: Arc<dyn ReachabilityProbe>,
    probe_timeout: Duration,
    notifier: broadcast::Sender<ReachabilityChange>,
}

impl ConnectivityOracle {
    pub fn new(probe: Arc<dyn ReachabilityProbe>, config: &ConnectivityConfig) -> Self {
        let (notifier, _) = broadcast::channel(config.notify_capacity.max(1));
        metrics::record_reachability(config.assume_reachable);

        Self {
            state: ArcSwap::from_pointee(ReachabilityState::initial(config.assume_reachable)),
            write_lock: Mutex::new(()),
            probe,
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
            notifier,
        }
    }

    /// Last known reachability. Never blocks, never fails.
    pub fn is_reachable_now(&self) -> bool {
        self.state.load().reachable
    }

    /// Full snapshot including version and source.
    pub fn snapshot(&self) -> Arc<ReachabilityState> {
        self.state.load_full()
    }

    /// Run the active probe and apply its answer.
    ///
    /// Probe errors and timeouts count as unreachable.
    pub async fn probe_reachability(&self) -> bool {
        let reachable = match tokio::time::timeout(self.probe_timeout, self.probe.probe()).await {
            Ok(Ok(reachable)) => reachable,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Reachability probe failed, treating network as unreachable");
                false
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.probe_timeout, "Reachability probe timed out, treating network as unreachable");
                false
            }
        };

        self.apply(reachable, ReachabilitySource::Probe);
        reachable
    }

    /// Platform push entry point. Returns true if this was a transition.
    pub fn report(&self, reachable: bool) -> bool {
        self.apply(reachable, ReachabilitySource::Platform)
    }

    /// Register an observer for reachability transitions.
    pub fn subscribe(&self) -> ReachabilitySubscription {
        ReachabilitySubscription {
            rx: self.notifier.subscribe(),
            skipped: 0,
        }
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.notifier.receiver_count()
    }

    fn apply(&self, reachable: bool, source: ReachabilitySource) -> bool {
        // The guard protects no data, so a poisoned lock is still usable.
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let previous = self.state.load();
        let next = previous.next(reachable, source);
        let changed = previous.reachable != reachable;
        let version = next.version;
        self.state.store(Arc::new(next));

        if changed {
            tracing::info!(reachable, version, source = %source, "Reachability changed");
            metrics::record_reachability(reachable);
            metrics::record_reachability_transition(reachable);

            // No observers is fine.
            let _ = self.notifier.send(ReachabilityChange {
                reachable,
                version,
                source,
            });
        } else {
            tracing::trace!(reachable, version, source = %source, "Reachability unchanged");
        }

        changed
    }
}

/// Receiving end for reachability transitions.
///
/// Dropping it unsubscribes.
pub struct ReachabilitySubscription {
    rx: broadcast::Receiver<ReachabilityChange>,
    skipped: u64,
}

impl ReachabilitySubscription {
    /// Wait for the next transition. `None` once the oracle is gone.
    pub async fn recv(&mut self) -> Option<ReachabilityChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) => return Some(change),
                Err(RecvError::Lagged(n)) => self.note_lag(n),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next queued transition, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<ReachabilityChange> {
        loop {
            match self.rx.try_recv() {
                Ok(change) => return Some(change),
                Err(TryRecvError::Lagged(n)) => self.note_lag(n),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Transitions dropped because this observer fell behind.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn note_lag(&mut self, n: u64) {
        tracing::warn!(skipped = n, "Reachability observer lagged, older transitions dropped");
        self.skipped += n;
    }
}
