//! The authoritative in-memory collection of every record type.
//!
//! # Design
//!
//! - **Per-type id counters**: each collection hands out ids starting at 1.
//!   A counter advances only after the record is in its collection, so a
//!   rejected create never burns an id.
//! - **Insertion order**: collections are keyed by id in a [`BTreeMap`]; ids
//!   only grow, so key order is insertion order.
//! - **Append-only**: nothing is deleted. The only mutation after creation
//!   is [`EntityStore::update_status`].
//! - **Single writer**: every mutating method takes `&mut self`. Callers
//!   sharing the store across tasks wrap it in a lock so the id increment
//!   and the insert happen as one step.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use ddos_sim_types::{
    Account, AccountId, DdosTest, NewAccount, NewDdosTest, NewTargetServer, NewTrafficLog,
    ServerId, TargetServer, TestId, TestStatus, TrafficLog, TrafficLogId,
};

use crate::StoreError;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Behavioral switches for an [`EntityStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Reject traffic logs whose `testId` is not in the store.
    ///
    /// Off by default: producers have always been allowed to submit
    /// samples for tests this process has never seen.
    pub strict_log_references: bool,
}

/// Record counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCounts {
    /// Registered accounts.
    pub accounts: usize,
    /// Registered target servers.
    pub servers: usize,
    /// Created tests.
    pub tests: usize,
    /// Stored traffic samples.
    pub traffic_logs: usize,
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// One id-keyed collection plus its counter.
#[derive(Debug)]
struct Table<I, T> {
    name: &'static str,
    rows: BTreeMap<I, T>,
    next: u64,
}

impl<I, T> Table<I, T>
where
    I: Copy + Ord + From<u64>,
    T: Clone,
{
    const fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: BTreeMap::new(),
            next: 1,
        }
    }

    /// Place a record built from the next id, then advance the counter.
    fn insert_with(&mut self, build: impl FnOnce(I) -> T) -> Result<T, StoreError> {
        let following = self
            .next
            .checked_add(1)
            .ok_or(StoreError::IdExhausted(self.name))?;
        let id = I::from(self.next);
        let row = build(id);
        self.rows.insert(id, row.clone());
        self.next = following;
        Ok(row)
    }

    fn get(&self, id: I) -> Option<&T> {
        self.rows.get(&id)
    }

    fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.rows.get_mut(&id)
    }

    fn contains(&self, id: I) -> bool {
        self.rows.contains_key(&id)
    }

    fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

// ---------------------------------------------------------------------------
// EntityStore
// ---------------------------------------------------------------------------

/// In-memory store for accounts, target servers, tests, and traffic logs.
///
/// Constructed once at startup and handed to the HTTP router and the
/// realtime channel. Nothing is persisted; all records die with the
/// process.
#[derive(Debug)]
pub struct EntityStore {
    accounts: Table<AccountId, Account>,
    servers: Table<ServerId, TargetServer>,
    tests: Table<TestId, DdosTest>,
    logs: Table<TrafficLogId, TrafficLog>,
    /// Log ids per test, in insertion order.
    logs_by_test: BTreeMap<TestId, Vec<TrafficLogId>>,
    options: StoreOptions,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl EntityStore {
    /// Create an empty store.
    pub const fn new(options: StoreOptions) -> Self {
        Self {
            accounts: Table::new("account"),
            servers: Table::new("server"),
            tests: Table::new("test"),
            logs: Table::new("traffic log"),
            logs_by_test: BTreeMap::new(),
            options,
        }
    }

    /// The options this store was created with.
    pub const fn options(&self) -> StoreOptions {
        self.options
    }

    /// Record counts per collection.
    pub fn counts(&self) -> StoreCounts {
        StoreCounts {
            accounts: self.accounts.len(),
            servers: self.servers.len(),
            tests: self.tests.len(),
            traffic_logs: self.logs.len(),
        }
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateUsername`] if the username is taken.
    pub fn create_account(&mut self, new: NewAccount) -> Result<Account, StoreError> {
        if self.account_by_username(&new.username).is_some() {
            return Err(StoreError::DuplicateUsername(new.username));
        }
        let account = self.accounts.insert_with(|id| Account {
            id,
            username: new.username,
            password_hash: new.password_hash,
        })?;
        debug!(account_id = %account.id, username = %account.username, "Account created");
        Ok(account)
    }

    /// Look up an account by id.
    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// Look up an account by exact username.
    pub fn account_by_username(&self, username: &str) -> Option<&Account> {
        self.accounts.values().find(|a| a.username == username)
    }

    // -----------------------------------------------------------------------
    // Target servers
    // -----------------------------------------------------------------------

    /// Register a target server, stamping `registeredAt` with the current time.
    pub fn create_server(&mut self, new: NewTargetServer) -> Result<TargetServer, StoreError> {
        let registered_at = Utc::now();
        let server = self.servers.insert_with(|id| TargetServer {
            id,
            hostname: new.hostname,
            ip_address: new.ip_address,
            location: new.location,
            registered_at,
        })?;
        debug!(server_id = %server.id, hostname = %server.hostname, "Target server registered");
        Ok(server)
    }

    /// Look up a target server by id.
    pub fn server(&self, id: ServerId) -> Option<&TargetServer> {
        self.servers.get(id)
    }

    /// All target servers in registration order.
    pub fn servers(&self) -> Vec<TargetServer> {
        self.servers.values().cloned().collect()
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    /// Create a test.
    ///
    /// `status` defaults to `pending` and `startTime` to the current time.
    /// A pending test may name a server that is not registered yet; any
    /// other initial status requires the server to exist, the same rule
    /// [`update_status`](Self::update_status) applies.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnregisteredServer`] for a non-pending test
    /// whose server is missing. No id is consumed.
    pub fn create_test(&mut self, new: NewDdosTest) -> Result<DdosTest, StoreError> {
        let status = new.status.unwrap_or_default();
        if status != TestStatus::Pending && !self.servers.contains(new.server_id) {
            return Err(StoreError::UnregisteredServer {
                server: new.server_id,
                status,
            });
        }
        let start_time = new.start_time.unwrap_or_else(Utc::now);
        let test = self.tests.insert_with(|id| DdosTest {
            id,
            server_id: new.server_id,
            attack_method: new.attack_method,
            packet_size: new.packet_size,
            duration: new.duration,
            total_requests: new.total_requests,
            status,
            start_time,
            end_time: new.end_time,
        })?;
        if !self.servers.contains(test.server_id) {
            debug!(
                test_id = %test.id,
                server_id = %test.server_id,
                "Test created against an unregistered server"
            );
        }
        debug!(test_id = %test.id, method = %test.attack_method, status = %test.status, "Test created");
        Ok(test)
    }

    /// Look up a test by id.
    pub fn test(&self, id: TestId) -> Option<&DdosTest> {
        self.tests.get(id)
    }

    /// All tests in creation order.
    pub fn tests(&self) -> Vec<DdosTest> {
        self.tests.values().cloned().collect()
    }

    /// Replace the status of an existing test and return the updated record.
    ///
    /// Only `status` changes. There is no ordering check between states and
    /// no concurrency token: the last write wins, which is fine while a
    /// single producer drives each test.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no such test exists.
    /// - [`StoreError::UnknownServer`] if `status` is not `pending` and the
    ///   test's target server is not registered.
    ///
    /// In both cases the store is left unchanged.
    pub fn update_status(
        &mut self,
        id: TestId,
        status: TestStatus,
    ) -> Result<DdosTest, StoreError> {
        let server_id = self
            .tests
            .get(id)
            .map(|t| t.server_id)
            .ok_or(StoreError::NotFound {
                entity: "test",
                id: id.get(),
            })?;

        if status != TestStatus::Pending && !self.servers.contains(server_id) {
            return Err(StoreError::UnknownServer {
                test: id,
                server: server_id,
            });
        }

        let test = self.tests.get_mut(id).ok_or(StoreError::NotFound {
            entity: "test",
            id: id.get(),
        })?;
        let previous = test.status;
        test.status = status;
        debug!(test_id = %id, from = %previous, to = %status, "Test status replaced");
        Ok(test.clone())
    }

    // -----------------------------------------------------------------------
    // Traffic logs
    // -----------------------------------------------------------------------

    /// Append a traffic sample, stamping `timestamp` if the producer left it out.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownTest`] in strict mode when the referenced
    /// test does not exist.
    pub fn create_traffic_log(&mut self, new: NewTrafficLog) -> Result<TrafficLog, StoreError> {
        if !self.tests.contains(new.test_id) {
            if self.options.strict_log_references {
                return Err(StoreError::UnknownTest(new.test_id));
            }
            warn!(test_id = %new.test_id, "Accepting traffic log for unknown test");
        }

        let timestamp = new.timestamp.unwrap_or_else(Utc::now);
        let log = self.logs.insert_with(|id| TrafficLog {
            id,
            test_id: new.test_id,
            timestamp,
            packets_sent: new.packets_sent,
            packets_received: new.packets_received,
            response_time: new.response_time,
            source_ip: new.source_ip,
            destination_ip: new.destination_ip,
        })?;
        self.logs_by_test.entry(log.test_id).or_default().push(log.id);
        Ok(log)
    }

    /// Look up a traffic sample by id.
    pub fn traffic_log(&self, id: TrafficLogId) -> Option<&TrafficLog> {
        self.logs.get(id)
    }

    /// Every sample for `test_id`, in the order it was stored.
    ///
    /// Returns an empty list for unknown tests.
    pub fn test_logs(&self, test_id: TestId) -> Vec<TrafficLog> {
        self.logs_by_test
            .get(&test_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.logs.get(*id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
