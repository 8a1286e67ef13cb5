//! Graceful Shutdown Coordination
//!
//! One-shot, idempotent shutdown trigger shared between the signal
//! watcher, the listener task, and the lifecycle controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Shutdown coordinator.
///
/// Cloning shares the underlying state; any clone may trigger shutdown,
/// and every subscriber observes it exactly once.
#[derive(Clone)]
pub struct ShutdownController {
    /// Whether shutdown has been initiated
    triggered: Arc<AtomicBool>,
    /// Broadcast channel for the shutdown signal
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            tx,
        }
    }

    /// Subscribe to the shutdown notification.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Request shutdown. Safe to call more than once; only the first
    /// call notifies subscribers.
    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            tracing::info!("initiating graceful shutdown");
            let _ = self.tx.send(());
        }
    }

    /// Check whether shutdown has been initiated.
    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Wait until shutdown is triggered. Completes immediately when the
    /// trigger already fired, so a waiter that starts late cannot miss
    /// it.
    pub async fn triggered(&self) {
        // Subscribe before checking the flag: a trigger that lands
        // between the two is picked up by either the flag or the
        // receiver.
        let mut rx = self.tx.subscribe();
        if self.is_triggered() {
            return;
        }
        let _ = rx.recv().await;
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Block until an interrupt or terminate signal arrives, then trigger
/// the controller.
///
/// Handlers are registered before the wait begins so a signal delivered
/// early is not lost.
#[cfg_attr(coverage_nightly, coverage(off))]
pub async fn wait_for_signal(controller: ShutdownController) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupt =
            signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        let mut terminate =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = interrupt.recv() => {
                tracing::info!("received SIGINT, initiating shutdown");
            }
            _ = terminate.recv() => {
                tracing::info!("received SIGTERM, initiating shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
        tracing::info!("received Ctrl+C, initiating shutdown");
    }

    controller.trigger();
}
