//! # HTTP API
//!
//! JSON endpoints polled by the production dashboard.
//!
//! ## Endpoints
//!
//! - `GET  /health` - Health check
//! - `POST /api/auth/login` - Login, returns a bearer token
//! - `GET  /api/auth/lookup/{num_empleado}` - Operator lookup by badge
//! - `GET  /api/lines` - State of every line
//! - `POST /api/lines/{id}/start|stop|reset` - Line timers
//! - `GET  /api/history` and `/api/history/export` - Cycle history
//! - `GET  /api/logs` - Cycle records (admin only)
//! - `GET  /api/stencils/{identifier}` - Stencil metadata
//! - `POST /api/tensions`, `GET /api/tensions/latest|export|{numero}/all`
//!
//! ## Configuration
//!
//! - `cors_origins` (`CORS_ORIGINS`): comma-separated origins or "*" (default: localhost only)
//! - `static_dir` (`STATIC_DIR`): built dashboard served for every other path

mod auth;
pub mod handlers;
pub mod types;

pub use auth::{authorize_admin, bearer_token};

use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: configuration and both databases.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Cycles, stencil metadata and tensions.
    pub stencil: DbPool,
    /// Operator credentials.
    pub cred: DbPool,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, stencil: DbPool, cred: DbPool) -> Self {
        Self {
            config: Arc::new(config),
            stencil,
            cred,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build the CORS layer from the configured origins.
///
/// - "*": any origin
/// - empty: localhost only
/// - otherwise: comma-separated list of allowed origins
fn build_cors_layer(origins: &str) -> CorsLayer {
    match origins.trim() {
        "*" => {
            tracing::warn!("CORS: Allowing ALL origins (cors_origins = \"*\")");
            CorsLayer::permissive()
        }
        "" => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
        list => {
            let allowed_origins: Vec<HeaderValue> = list
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
    }
}

/// Restrictive CORS layer for the dashboard dev servers.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
    ];
    let origins: Vec<HeaderValue> = localhost_origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.cors_origins);

    let admin = Router::new()
        .route("/api/logs", get(handlers::logs::logs_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/auth/login", post(handlers::auth::login_handler))
        .route(
            "/api/auth/lookup/{num_empleado}",
            get(handlers::auth::lookup_handler),
        )
        .route("/api/lines", get(handlers::lines::lines_handler))
        .route("/api/lines/{id}/start", post(handlers::lines::start_handler))
        .route("/api/lines/{id}/stop", post(handlers::lines::stop_handler))
        .route("/api/lines/{id}/reset", post(handlers::lines::reset_handler))
        .route("/api/history", get(handlers::history::history_handler))
        .route(
            "/api/history/export",
            get(handlers::history::history_export_handler),
        )
        .route(
            "/api/stencils/{identifier}",
            get(handlers::stencils::stencil_handler),
        )
        .route(
            "/api/tensions",
            post(handlers::tensions::create_tension_handler),
        )
        .route(
            "/api/tensions/latest",
            get(handlers::tensions::latest_handler),
        )
        .route(
            "/api/tensions/export",
            get(handlers::tensions::export_handler),
        )
        .route(
            "/api/tensions/{numero}/all",
            get(handlers::tensions::history_for_numero_handler),
        )
        .merge(admin);

    if let Some(dir) = state.config.static_dir.as_deref() {
        let index = Path::new(dir).join("index.html");
        tracing::info!("Serving dashboard from {}", dir);
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn run_server(addr: &str, state: AppState) -> AppResult<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Other(format!("Bind failed on {addr}: {e}")))?;

    tracing::info!("stencil-control listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Other(format!("Server error: {e}")))?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
