//! Authentication session storage.
//!
//! The HTTP layer only needs a put/get/expire contract keyed by an opaque
//! token, so the contract is a trait. [`MemorySessionStore`] is the only
//! implementation: sessions live in a map and vanish with the process,
//! and expired entries are dropped lazily on read and in bulk by
//! [`SessionStore::purge_expired`].

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;
use uuid::Uuid;

use ddos_sim_types::AccountId;

/// Opaque session token carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wrap a token received from a client.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as sent to the client.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// State attached to an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    /// The logged-in account.
    pub account_id: AccountId,
    /// Instant after which the session is no longer valid.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session for `account_id` valid for `ttl` from `now`.
    pub fn new(account_id: AccountId, now: DateTime<Utc>, ttl: TimeDelta) -> Self {
        Self {
            account_id,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Whether the session has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Backing storage for authentication sessions.
pub trait SessionStore: Send + Sync {
    /// Store or replace the session under `id`.
    fn put(&mut self, id: SessionId, session: Session);

    /// Fetch a live session. Expired sessions are removed and reported as absent.
    fn get(&mut self, id: &SessionId, now: DateTime<Utc>) -> Option<Session>;

    /// Remove a session. Returns whether one was present.
    fn expire(&mut self, id: &SessionId) -> bool;

    /// Drop every session that has expired at `now`. Returns how many were dropped.
    fn purge_expired(&mut self, now: DateTime<Utc>) -> usize;

    /// Number of stored sessions, expired or not.
    fn len(&self) -> usize;

    /// Whether no sessions are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local [`SessionStore`].
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: HashMap<SessionId, Session>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn put(&mut self, id: SessionId, session: Session) {
        self.sessions.insert(id, session);
    }

    fn get(&mut self, id: &SessionId, now: DateTime<Utc>) -> Option<Session> {
        let session = *self.sessions.get(id)?;
        if session.is_expired(now) {
            self.sessions.remove(id);
            debug!(account_id = %session.account_id, "Dropped expired session on read");
            return None;
        }
        Some(session)
    }

    fn expire(&mut self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| !s.is_expired(now));
        before.saturating_sub(self.sessions.len())
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour() -> TimeDelta {
        TimeDelta::hours(1)
    }

    #[test]
    fn generated_tokens_are_distinct() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn put_then_get_returns_session() {
        let mut store = MemorySessionStore::new();
        let now = Utc::now();
        let id = SessionId::generate();
        let session = Session::new(AccountId(1), now, hour());
        store.put(id.clone(), session);
        assert_eq!(store.get(&id, now), Some(session));
    }

    #[test]
    fn expired_session_is_absent_and_removed() {
        let mut store = MemorySessionStore::new();
        let now = Utc::now();
        let id = SessionId::generate();
        store.put(id.clone(), Session::new(AccountId(1), now, hour()));

        let later = now + TimeDelta::hours(2);
        assert_eq!(store.get(&id, later), None);
        assert!(store.is_empty());
    }

    #[test]
    fn expire_removes_session() {
        let mut store = MemorySessionStore::new();
        let id = SessionId::generate();
        store.put(id.clone(), Session::new(AccountId(1), Utc::now(), hour()));
        assert!(store.expire(&id));
        assert!(!store.expire(&id));
        assert_eq!(store.get(&id, Utc::now()), None);
    }

    #[test]
    fn purge_drops_only_expired_sessions() {
        let mut store = MemorySessionStore::new();
        let now = Utc::now();
        store.put(
            SessionId::generate(),
            Session::new(AccountId(1), now, TimeDelta::minutes(1)),
        );
        store.put(SessionId::generate(), Session::new(AccountId(2), now, hour()));

        let purged = store.purge_expired(now + TimeDelta::minutes(5));
        assert_eq!(purged, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn huge_ttl_saturates() {
        let session = Session::new(AccountId(1), Utc::now(), TimeDelta::MAX);
        assert!(!session.is_expired(Utc::now()));
    }
}
