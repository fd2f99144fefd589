//! REST API endpoint handlers.
//!
//! Every handler works against the shared [`EntityStore`] held in
//! [`AppState`]. Creates and status updates take the store write lock and
//! publish their realtime frame before releasing it.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/api/servers` | List target servers |
//! | `POST` | `/api/servers` | Register a target server |
//! | `GET` | `/api/ddos-tests` | List tests |
//! | `POST` | `/api/ddos-tests` | Create a test |
//! | `GET` | `/api/ddos-tests/{id}` | Get a single test |
//! | `PATCH` | `/api/ddos-tests/{id}/status` | Replace a test's status |
//! | `GET` | `/api/ddos-tests/{id}/logs` | Traffic samples for a test |
//!
//! [`EntityStore`]: ddos_sim_store::EntityStore

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use tracing::info;

use ddos_sim_types::{
    AttackMethod, DdosTest, NewDdosTest, NewTargetServer, ServerMessage, StatusUpdate,
    TargetServer, TestId, TrafficLog,
};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::ValidJson;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing record counts and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let counts = state.store.read().await.counts();
    let subscribers = state.subscriber_count();
    let methods = AttackMethod::ALL
        .iter()
        .map(|m| m.label())
        .collect::<Vec<_>>()
        .join(", ");

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>DDoS Simulator</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #f85149; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .verb {{ color: #7ee787; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>DDoS Simulator</h1>
    <p class="subtitle">Controlled traffic test recorder. Attack methods: {methods}</p>

    <div>
        <div class="metric">
            <div class="label">Servers</div>
            <div class="value">{servers}</div>
        </div>
        <div class="metric">
            <div class="label">Tests</div>
            <div class="value">{tests}</div>
        </div>
        <div class="metric">
            <div class="label">Traffic logs</div>
            <div class="value">{logs}</div>
        </div>
        <div class="metric">
            <div class="label">Live viewers</div>
            <div class="value">{subscribers}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <p>All <code>/api</code> data routes require a session cookie from <code>/api/login</code>.</p>
    <ul>
        <li><span class="verb">POST</span> /api/register, /api/login, /api/logout</li>
        <li><span class="verb">GET</span> /api/user</li>
        <li><span class="verb">GET POST</span> /api/servers</li>
        <li><span class="verb">GET POST</span> /api/ddos-tests</li>
        <li><span class="verb">GET</span> /api/ddos-tests/{{id}}</li>
        <li><span class="verb">PATCH</span> /api/ddos-tests/{{id}}/status</li>
        <li><span class="verb">GET</span> /api/ddos-tests/{{id}}/logs</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws</code> -- Live traffic log, test, and status stream</li>
    </ul>
</body>
</html>"#,
        servers = counts.servers,
        tests = counts.tests,
        logs = counts.traffic_logs,
    ))
}

/// Liveness probe.
///
/// # Route
///
/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Target servers
// ---------------------------------------------------------------------------

/// List every registered target server in id order.
///
/// # Route
///
/// `GET /api/servers`
pub async fn list_servers(State(state): State<Arc<AppState>>) -> Json<Vec<TargetServer>> {
    Json(state.store.read().await.servers())
}

/// Register a target server.
///
/// # Route
///
/// `POST /api/servers`
pub async fn create_server(
    State(state): State<Arc<AppState>>,
    ValidJson(new): ValidJson<NewTargetServer>,
) -> Result<impl IntoResponse, ApiError> {
    let server = state.store.write().await.create_server(new)?;
    info!(server_id = %server.id, hostname = %server.hostname, "Target server registered");
    Ok((StatusCode::CREATED, Json(server)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// List every test in id order.
///
/// # Route
///
/// `GET /api/ddos-tests`
pub async fn list_tests(State(state): State<Arc<AppState>>) -> Json<Vec<DdosTest>> {
    Json(state.store.read().await.tests())
}

/// Create a test and announce it on the realtime channel.
///
/// # Route
///
/// `POST /api/ddos-tests`
pub async fn create_test(
    State(state): State<Arc<AppState>>,
    ValidJson(new): ValidJson<NewDdosTest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut store = state.store.write().await;
    let test = store.create_test(new)?;
    let receivers = state.broadcast(ServerMessage::NewTest { data: test.clone() });
    drop(store);

    info!(
        test_id = %test.id,
        server_id = %test.server_id,
        method = %test.attack_method,
        receivers,
        "Test created"
    );
    Ok((StatusCode::CREATED, Json(test)))
}

/// Return a single test.
///
/// # Route
///
/// `GET /api/ddos-tests/{id}`
pub async fn get_test(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DdosTest>, ApiError> {
    let id = parse_id(&id)?;
    state
        .store
        .read()
        .await
        .test(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("test {id} not found")))
}

/// Replace the status of a test and announce the change.
///
/// # Route
///
/// `PATCH /api/ddos-tests/{id}/status`
pub async fn update_test_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidJson(update): ValidJson<StatusUpdate>,
) -> Result<Json<DdosTest>, ApiError> {
    let id = parse_id(&id)?;
    let mut store = state.store.write().await;
    let test = store.update_status(id, update.status)?;
    let receivers = state.broadcast(ServerMessage::TestUpdated { data: test.clone() });
    drop(store);

    info!(
        test_id = %test.id,
        status = %test.status,
        finished = test.status.is_terminal(),
        receivers,
        "Test status updated"
    );
    Ok(Json(test))
}

/// Every traffic sample recorded for a test, oldest first.
///
/// Unknown tests yield an empty list rather than `404`.
///
/// # Route
///
/// `GET /api/ddos-tests/{id}/logs`
pub async fn test_logs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TrafficLog>>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.read().await.test_logs(id)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a test id path segment, reporting failures against the `id` field.
fn parse_id(raw: &str) -> Result<TestId, ApiError> {
    raw.parse::<TestId>()
        .map_err(|e| ApiError::invalid("id", format!("{raw}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_numbers() {
        assert_eq!(parse_id("42").unwrap(), TestId(42));
    }

    #[test]
    fn parse_id_rejects_garbage() {
        let err = parse_id("abc").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, ApiError::Validation(ref v) if v.first().is_some_and(|f| f.field == "id")));
    }

    #[test]
    fn parse_id_rejects_negative() {
        assert!(parse_id("-1").is_err());
    }
}
