//! In-memory storage for the DDoS simulator.
//!
//! Two stores live here:
//!
//! - [`entity_store`] -- The [`EntityStore`]: accounts, target servers,
//!   tests, and traffic logs, each with its own monotonically increasing
//!   id counter.
//! - [`session`] -- The [`SessionStore`] contract and its in-memory
//!   implementation used by the HTTP layer for login sessions.
//!
//! Neither store is durable. Both are created once at startup and shared
//! with the server behind locks.
//!
//! # Usage
//!
//! ```
//! use ddos_sim_store::EntityStore;
//! use ddos_sim_types::{NewTargetServer, ServerId};
//!
//! let mut store = EntityStore::default();
//! let server = store
//!     .create_server(NewTargetServer {
//!         hostname: "a.com".to_owned(),
//!         ip_address: "1.1.1.1".to_owned(),
//!         location: "US".to_owned(),
//!     })
//!     .ok();
//! assert_eq!(server.map(|s| s.id), Some(ServerId(1)));
//! ```

pub mod entity_store;
pub mod error;
pub mod session;

pub use entity_store::{EntityStore, StoreCounts, StoreOptions};
pub use error::StoreError;
pub use session::{MemorySessionStore, Session, SessionId, SessionStore};
