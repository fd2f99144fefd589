//! Shared application state for the HTTP and realtime handlers.
//!
//! [`AppState`] owns the entity store, the session store, and the
//! broadcast sender for realtime frames. It is built once at startup and
//! injected into every handler through Axum's `State` extractor; nothing
//! lives in a global.
//!
//! The entity store sits behind a single [`RwLock`]. Handlers run on a
//! multi-threaded runtime, so every create takes the write lock for the id
//! increment, the insert, and the broadcast together. That keeps ids
//! unique and makes the broadcast order match the id order.

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use ddos_sim_store::{EntityStore, MemorySessionStore, SessionStore, StoreOptions};
use ddos_sim_types::ServerMessage;

use crate::config::{AppConfig, SessionConfig};

/// Default capacity of the realtime broadcast channel.
///
/// If a subscriber falls behind by more than this many frames it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest frame.
pub const BROADCAST_CAPACITY: usize = 256;

/// Session storage as held by the application.
pub type SharedSessions = Arc<RwLock<Box<dyn SessionStore>>>;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for realtime frames.
    pub tx: broadcast::Sender<ServerMessage>,
    /// The entity store.
    pub store: Arc<RwLock<EntityStore>>,
    /// Login sessions.
    pub sessions: SharedSessions,
    /// Session cookie settings.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Create state with default options and an empty store.
    pub fn new() -> Self {
        Self::with_parts(
            EntityStore::default(),
            Box::new(MemorySessionStore::new()),
            SessionConfig::default(),
            BROADCAST_CAPACITY,
        )
    }

    /// Create state from loaded configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_parts(
            EntityStore::new(config.store.options()),
            Box::new(MemorySessionStore::new()),
            config.session.clone(),
            config.realtime.broadcast_capacity,
        )
    }

    /// Create state with an empty store using `options`.
    pub fn with_store_options(options: StoreOptions) -> Self {
        Self::with_parts(
            EntityStore::new(options),
            Box::new(MemorySessionStore::new()),
            SessionConfig::default(),
            BROADCAST_CAPACITY,
        )
    }

    /// Assemble state from explicit parts.
    pub fn with_parts(
        store: EntityStore,
        sessions: Box<dyn SessionStore>,
        session_config: SessionConfig,
        broadcast_capacity: usize,
    ) -> Self {
        // broadcast::channel panics on zero capacity.
        let (tx, _) = broadcast::channel(broadcast_capacity.max(1));
        Self {
            tx,
            store: Arc::new(RwLock::new(store)),
            sessions: Arc::new(RwLock::new(sessions)),
            session_config,
        }
    }

    /// Subscribe to the realtime channel.
    ///
    /// The receiver only sees frames published after this call; there is no
    /// replay of earlier frames.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.tx.subscribe()
    }

    /// Publish a frame to all connected subscribers.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, message: ServerMessage) -> usize {
        // send returns Err only when there are zero receivers,
        // which is normal when no WebSocket clients are connected.
        self.tx.send(message).unwrap_or(0)
    }

    /// Number of currently subscribed receivers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
