//! HTTP and realtime server for the DDoS simulator.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **Account endpoints** (`/api/register`, `/api/login`, `/api/logout`,
//!   `/api/user`) backed by cookie sessions
//! - **REST endpoints** for target servers, tests, and traffic logs, all
//!   behind the session check
//! - **`WebSocket` endpoint** (`/ws`) where producers push traffic samples
//!   and viewers receive every new log, test, and status change via
//!   [`tokio::sync::broadcast`]
//! - **Minimal HTML status page** (`GET /`) with record counts
//!
//! # Architecture
//!
//! All records live in an in-memory [`EntityStore`] owned by [`AppState`]
//! and guarded by one `RwLock`. Mutations publish their realtime frame
//! while still holding the write lock, so subscribers see frames in id
//! order. Nothing is persisted; a restart starts from empty.
//!
//! [`EntityStore`]: ddos_sim_store::EntityStore

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod validation;
pub mod ws;

// Re-export primary types for convenience.
pub use config::{AppConfig, ConfigError};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
