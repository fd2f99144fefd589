//! Axum router construction.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// Public routes:
/// - `GET /` -- minimal HTML status page
/// - `GET /health` -- liveness probe
/// - `POST /api/register`, `/api/login`, `/api/logout`
/// - `GET /ws` -- realtime channel
///
/// Everything else under `/api` passes through [`auth::require_auth`]
/// first and answers `401` without a live session.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .route("/api/user", get(auth::current_user))
        .route(
            "/api/servers",
            get(handlers::list_servers).post(handlers::create_server),
        )
        .route(
            "/api/ddos-tests",
            get(handlers::list_tests).post(handlers::create_test),
        )
        .route("/api/ddos-tests/{id}", get(handlers::get_test))
        .route(
            "/api/ddos-tests/{id}/status",
            patch(handlers::update_test_status),
        )
        .route("/api/ddos-tests/{id}/logs", get(handlers::test_logs))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_auth,
        ));

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        // WebSocket
        .route("/ws", get(ws::ws_realtime))
        // Accounts
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
