//! Auction Platform API
//!
//! Service bootstrap core: a resilient shared database pool and a
//! signal-driven, bounded graceful shutdown around the HTTP listener.
//! Exposed as a library for integration tests.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod db;
pub mod lifecycle;
pub mod server;
pub mod shutdown;

// Re-export commonly used types
pub use config::{load_config, AppEnv, Config};
pub use db::{PoolError, PoolManager, PostgresConnector, RetryPolicy, StoreConnector, StorePool};
pub use lifecycle::{Lifecycle, StartupError};
pub use server::{build_router, AppState};
pub use shutdown::ShutdownController;
