//! Service Lifecycle Controller
//!
//! Sequences startup (pool first, listener second), runs the listener on
//! its own task, and drives a single bounded shutdown when a termination
//! signal arrives or the listener fails.

use crate::db::{PoolError, PoolManager, StoreConnector};
use crate::shutdown::{wait_for_signal, ShutdownController};
use axum::Router;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Time allowed for in-flight requests to drain after shutdown begins.
const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(10);

/// Fatal conditions. The process must exit non-zero without (or after)
/// serving traffic.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("database startup failed: {0}")]
    Database(#[from] PoolError),
    #[error("listener failed: {0}")]
    Listener(#[source] io::Error),
}

/// Owns the listener and the shutdown sequence.
pub struct Lifecycle<C: StoreConnector> {
    listener: TcpListener,
    local_addr: SocketAddr,
    db: Arc<PoolManager<C>>,
    shutdown: ShutdownController,
    drain_deadline: Duration,
}

impl<C: StoreConnector> Lifecycle<C> {
    /// Establish the pool (blocking, with retries inside), then bind the
    /// listener. The pool is live before any request can arrive.
    ///
    /// A bind failure releases the already-acquired pool before
    /// propagating; there is no partial startup.
    pub async fn start(listen_addr: &str, db: Arc<PoolManager<C>>) -> Result<Self, StartupError> {
        db.connect().await?;

        let listener = match TcpListener::bind(listen_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!(addr = listen_addr, error = %e, "failed to bind listener");
                db.close().await;
                return Err(StartupError::Listener(e));
            }
        };

        let local_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                db.close().await;
                return Err(StartupError::Listener(e));
            }
        };

        Ok(Self {
            listener,
            local_addr,
            db,
            shutdown: ShutdownController::new(),
            drain_deadline: SHUTDOWN_DEADLINE,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle for requesting shutdown outside the signal path.
    pub fn shutdown_handle(&self) -> ShutdownController {
        self.shutdown.clone()
    }

    /// Override the drain deadline.
    pub fn with_drain_deadline(mut self, deadline: Duration) -> Self {
        self.drain_deadline = deadline;
        self
    }

    /// Serve until a termination signal or a fatal listener condition,
    /// then drive the shutdown sequence: stop accepting, drain in-flight
    /// requests up to the deadline, and release the pool unconditionally.
    ///
    /// A clean shutdown returns `Ok`; only a fatal listener condition is
    /// an error. A drain timeout is logged and absorbed.
    pub async fn run(self, app: Router) -> Result<(), StartupError> {
        let Lifecycle {
            listener,
            local_addr,
            db,
            shutdown,
            drain_deadline,
        } = self;

        let graceful = shutdown.clone();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            graceful.triggered().await;
        });

        tracing::info!(addr = %local_addr, "server listening");
        let mut server_task: JoinHandle<io::Result<()>> =
            tokio::spawn(async move { server.await });

        // Level-checked waits: a trigger fired before this point is
        // still observed.
        let waiter = shutdown.clone();
        let fatal = tokio::select! {
            _ = wait_for_signal(shutdown.clone()) => None,
            _ = waiter.triggered() => None,
            res = &mut server_task => Some(listener_exit_error(res)),
        };

        // A listener failure drives the same shutdown path as a signal.
        shutdown.trigger();

        if fatal.is_none() {
            tracing::info!("shutting down server");
            if !drain_listener(&mut server_task, drain_deadline).await {
                server_task.abort();
            }
        }

        // The pool is always released on the way out, whether or not the
        // listener stopped cleanly.
        db.close().await;

        match fatal {
            Some(e) => Err(e),
            None => {
                tracing::info!("server shut down");
                Ok(())
            }
        }
    }
}

/// Wait for the listener task to finish draining, bounded by the
/// deadline. Returns false if the deadline elapsed first.
async fn drain_listener(task: &mut JoinHandle<io::Result<()>>, deadline: Duration) -> bool {
    match tokio::time::timeout(deadline, &mut *task).await {
        Ok(Ok(Ok(()))) => true,
        Ok(Ok(Err(e))) => {
            tracing::warn!(error = %e, "listener reported an error during shutdown");
            true
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "listener task failed during shutdown");
            true
        }
        Err(_) => {
            tracing::warn!(
                "shutdown deadline of {:?} elapsed with requests still in flight",
                deadline
            );
            false
        }
    }
}

/// The listener exited without a shutdown request: bind races, accept
/// loop failure, or task panic. All are terminal.
fn listener_exit_error(res: Result<io::Result<()>, tokio::task::JoinError>) -> StartupError {
    let err = match res {
        Ok(Ok(())) => io::Error::new(io::ErrorKind::Other, "listener stopped unexpectedly"),
        Ok(Err(e)) => e,
        Err(e) => io::Error::new(io::ErrorKind::Other, e.to_string()),
    };
    tracing::error!(error = %err, "listener terminated outside shutdown");
    StartupError::Listener(err)
}
