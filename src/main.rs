//! Auction Platform API server
//!
//! Composition root: configuration, logging, the shared pool, and the
//! lifecycle controller that ties them together.

use auction_api::config::{load_config, AppEnv};
use auction_api::db::{PoolManager, PostgresConnector, RetryPolicy};
use auction_api::lifecycle::Lifecycle;
use auction_api::server::{build_router, AppState};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = load_config();

    // Human-readable debug output in development, JSON in production.
    match cfg.app_env {
        AppEnv::Development => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter("debug"))
                .init();
        }
        AppEnv::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(env_filter("info"))
                .init();
        }
    }

    tracing::info!(env = ?cfg.app_env, port = cfg.server_port, "starting auction-api");

    let connector = match PostgresConnector::new(&cfg.database_url, cfg.db_max_connections) {
        Ok(connector) => connector,
        Err(e) => {
            tracing::error!(error = %e, "invalid database configuration");
            std::process::exit(1);
        }
    };
    let db = Arc::new(PoolManager::new(connector, RetryPolicy::default()));

    let lifecycle = match Lifecycle::start(&cfg.listen_addr(), db.clone()).await {
        Ok(lifecycle) => lifecycle,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            std::process::exit(1);
        }
    };

    let app = build_router(AppState { db });

    if let Err(e) = lifecycle.run(app).await {
        tracing::error!(error = %e, "server terminated abnormally");
        std::process::exit(1);
    }

    Ok(())
}
