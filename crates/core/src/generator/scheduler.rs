//! Periodic regeneration of the config lines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::RefreshConfig;

use super::service::ConfigGenerator;

/// Runs [`ConfigGenerator::list_custom_configs`] on a fixed interval.
///
/// The first cycle runs right after [`start`](Self::start); cycles share the
/// generator's lock with API calls, so they never overlap.
pub struct RefreshScheduler {
    generator: Arc<ConfigGenerator>,
    interval: Duration,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl RefreshScheduler {
    pub fn new(generator: Arc<ConfigGenerator>, interval: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            generator,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Scheduler for `[refresh]`, or `None` when `interval_hours` is 0.
    pub fn from_config(generator: Arc<ConfigGenerator>, config: &RefreshConfig) -> Option<Self> {
        if config.interval_hours == 0 {
            return None;
        }
        Some(Self::new(
            generator,
            Duration::from_secs(config.interval_hours * 3600),
        ))
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawn the refresh loop. Returns `None` if it is already running.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Refresh scheduler already running");
            return None;
        }

        let generator = Arc::clone(&self.generator);
        let running = Arc::clone(&self.running);
        let period = self.interval;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        info!(interval_secs = period.as_secs(), "Starting config refresh loop");

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Refresh loop received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        let envelope = generator.list_custom_configs().await;
                        if !envelope.is_ok() {
                            warn!(message = %envelope.message, "Scheduled config refresh failed");
                        }
                    }
                }
            }
            info!("Refresh loop stopped");
        }))
    }

    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("Stopping config refresh loop");
        let _ = self.shutdown_tx.send(());
    }
}
