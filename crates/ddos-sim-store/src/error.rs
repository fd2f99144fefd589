//! Error type for store operations.

use ddos_sim_types::{ServerId, TestId, TestStatus};

/// Errors returned by [`EntityStore`](crate::EntityStore) operations.
///
/// A failed operation never leaves a partial write behind and never
/// advances an id counter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Record type name.
        entity: &'static str,
        /// The missing id.
        id: u64,
    },

    /// A test tried to leave `pending` while its target server is missing.
    #[error("test {test} targets unknown server {server}")]
    UnknownServer {
        /// The test being updated.
        test: TestId,
        /// The dangling server reference.
        server: ServerId,
    },

    /// A test was created outside `pending` against a missing target server.
    #[error("cannot create a {status} test against unknown server {server}")]
    UnregisteredServer {
        /// The dangling server reference.
        server: ServerId,
        /// The requested initial status.
        status: TestStatus,
    },

    /// A traffic log referenced a test that does not exist (strict mode only).
    #[error("traffic log references unknown test {0}")]
    UnknownTest(TestId),

    /// The username is already registered.
    #[error("username {0:?} is already taken")]
    DuplicateUsername(String),

    /// The id counter for a record type reached `u64::MAX`.
    #[error("id space exhausted for {0}")]
    IdExhausted(&'static str),
}
