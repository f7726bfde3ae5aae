//! Background connectivity monitoring.
//!
//! # Responsibilities
//! - Probe once on start so the cache reflects reality early
//! - Periodically re-probe the network
//! - Forward platform push notifications into the oracle
//!
//! The monitor is a scoped resource: `spawn` attaches it to the oracle and
//! the returned handle detaches it, either explicitly via `shutdown` or by
//! aborting the task on drop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::ConnectivityConfig;
use crate::connectivity::oracle::ConnectivityOracle;

pub struct ConnectivityMonitor {
    oracle: Arc<ConnectivityOracle>,
    config: ConnectivityConfig,
    platform: Option<mpsc::Receiver<bool>>,
}

impl ConnectivityMonitor {
    pub fn new(oracle: Arc<ConnectivityOracle>, config: ConnectivityConfig) -> Self {
        Self {
            oracle,
            config,
            platform: None,
        }
    }

    /// Attach a platform push source. Each value is a reachability report.
    pub fn with_platform_signal(mut self, signal: mpsc::Receiver<bool>) -> Self {
        self.platform = Some(signal);
        self
    }

    /// Start monitoring in a background task.
    ///
    /// The task also stops when `shutdown` fires.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> MonitorHandle {
        let stop = CancellationToken::new();
        let task = tokio::spawn(self.run(stop.clone(), shutdown));
        MonitorHandle {
            stop,
            task: Some(task),
        }
    }

    async fn run(mut self, stop: CancellationToken, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.config.probe_interval_secs,
            platform_signal = self.platform.is_some(),
            "Connectivity monitor starting"
        );

        if self.config.probe_on_start {
            tokio::select! {
                biased;
                _ = stop.cancelled() => return,
                _ = shutdown.recv() => return,
                reachable = self.oracle.probe_reachability() => {
                    tracing::info!(reachable, "Initial connectivity probe complete");
                }
            }
        }

        let mut ticker = (self.config.probe_interval_secs > 0).then(|| {
            let period = Duration::from_secs(self.config.probe_interval_secs);
            let mut ticker = time::interval_at(time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = shutdown.recv() => {
                    tracing::info!("Connectivity monitor received shutdown signal, exiting loop");
                    break;
                }
                _ = next_tick(&mut ticker) => {
                    // An abandoned probe leaves the oracle untouched.
                    tokio::select! {
                        biased;
                        _ = stop.cancelled() => break,
                        _ = shutdown.recv() => {
                            tracing::info!("Connectivity monitor received shutdown signal during probe");
                            break;
                        }
                        _ = self.oracle.probe_reachability() => {}
                    }
                }
                signal = next_signal(&mut self.platform) => match signal {
                    Some(reachable) => {
                        self.oracle.report(reachable);
                    }
                    None => {
                        tracing::warn!("Platform connectivity signal closed, continuing with active probes only");
                        self.platform = None;
                    }
                },
            }
        }

        tracing::info!("Connectivity monitor stopped");
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn next_signal(signal: &mut Option<mpsc::Receiver<bool>>) -> Option<bool> {
    match signal {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Ownership of a running monitor.
pub struct MonitorHandle {
    stop: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Stop the monitor and wait for it to detach from the oracle.
    pub async fn shutdown(mut self) {
        self.stop.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Connectivity monitor task failed");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
