//! HTTP Server Glue
//!
//! Routes and middleware served by the lifecycle controller. Handlers
//! reach the shared pool through the manager accessor, never a global.

use crate::db::{PoolManager, StoreConnector, StorePool};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state handed to request handlers.
pub struct AppState<C: StoreConnector> {
    pub db: Arc<PoolManager<C>>,
}

impl<C: StoreConnector> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

pub fn build_router<C: StoreConnector>(state: AppState<C>) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(healthcheck::<C>))
        .with_state(state);
    with_middleware(router)
}

/// Panic recovery, CORS, and request tracing for every route.
fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

async fn root() -> impl IntoResponse {
    "Welcome to the Auction Platform API"
}

async fn healthcheck<C: StoreConnector>(
    State(state): State<AppState<C>>,
) -> impl IntoResponse {
    match state.db.get() {
        Ok(pool) => match pool.ping().await {
            Ok(()) => (
                StatusCode::OK,
                Json(HealthResponse {
                    status: "ok".to_string(),
                    database: "up".to_string(),
                }),
            ),
            Err(e) => {
                tracing::error!(error = %e, "database ping failed in healthcheck");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(HealthResponse {
                        status: "degraded".to_string(),
                        database: "down".to_string(),
                    }),
                )
            }
        },
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded".to_string(),
                database: "unavailable".to_string(),
            }),
        ),
    }
}
