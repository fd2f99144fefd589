//! Stored records and their insert shapes.
//!
//! Each record type comes in two forms: the stored record (with the id and
//! any server-stamped fields) and a `New*` insert shape that request bodies
//! and realtime payloads are decoded into. Insert shapes carry `validator`
//! rules; structural problems (missing fields, wrong types) surface earlier
//! as decode errors.
//!
//! Field names are camelCase on the wire to match what the dashboard sends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

use crate::enums::{AttackMethod, TestStatus};
use crate::ids::{AccountId, ServerId, TestId, TrafficLogId};

/// Longest accepted test duration, in seconds.
pub const MAX_TEST_DURATION_SECS: u32 = 300;

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// A registered user. Immutable once created.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    /// Store-assigned identifier.
    pub id: AccountId,
    /// Login name, unique across the store.
    pub username: String,
    /// Salted credential hash in `<hash>.<salt>` form.
    pub password_hash: String,
}

impl Account {
    /// The projection of this account that is safe to return to clients.
    pub fn public(&self) -> PublicAccount {
        PublicAccount {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

impl core::fmt::Debug for Account {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Client-facing view of an [`Account`] without the credential hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PublicAccount {
    /// Account identifier.
    pub id: AccountId,
    /// Login name.
    pub username: String,
}

/// Registration and login request body.
#[derive(Clone, Deserialize, Validate)]
pub struct Credentials {
    /// Requested login name.
    #[validate(length(min = 1, max = 64, message = "username must be 1-64 characters"))]
    pub username: String,
    /// Plain-text password; hashed before it reaches the store.
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Insert shape for an [`Account`], produced after hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Login name.
    pub username: String,
    /// Salted credential hash.
    pub password_hash: String,
}

// ---------------------------------------------------------------------------
// Target server
// ---------------------------------------------------------------------------

/// A host registered as the target of simulated tests. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TargetServer {
    /// Store-assigned identifier.
    pub id: ServerId,
    /// Display hostname.
    pub hostname: String,
    /// Address the simulated traffic is aimed at.
    pub ip_address: String,
    /// Free-form location label (region, country, datacenter).
    pub location: String,
    /// When the store accepted the registration.
    pub registered_at: DateTime<Utc>,
}

/// Insert shape for a [`TargetServer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NewTargetServer {
    /// Display hostname.
    #[validate(length(min = 1, message = "hostname must not be empty"))]
    pub hostname: String,
    /// Target address. Also accepted as `address`.
    #[serde(alias = "address")]
    #[validate(length(min = 1, message = "ipAddress must not be empty"))]
    pub ip_address: String,
    /// Location label.
    #[validate(length(min = 1, message = "location must not be empty"))]
    pub location: String,
}

// ---------------------------------------------------------------------------
// DDoS test
// ---------------------------------------------------------------------------

/// A simulated attack run against a [`TargetServer`].
///
/// Only `status` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct DdosTest {
    /// Store-assigned identifier.
    pub id: TestId,
    /// The targeted server.
    pub server_id: ServerId,
    /// Simulated flood technique.
    pub attack_method: AttackMethod,
    /// Simulated packet size in bytes.
    pub packet_size: u32,
    /// Planned run length in seconds.
    pub duration: u32,
    /// Number of requests the producer intends to simulate.
    pub total_requests: u64,
    /// Current lifecycle state.
    pub status: TestStatus,
    /// When the run started (or was scheduled to).
    pub start_time: DateTime<Utc>,
    /// When the run ended, if the producer reported it.
    pub end_time: Option<DateTime<Utc>>,
}

/// Insert shape for a [`DdosTest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NewDdosTest {
    /// The targeted server. Also accepted as `targetServerId`.
    #[serde(alias = "targetServerId")]
    pub server_id: ServerId,
    /// Simulated flood technique. Also accepted as `method`.
    #[serde(alias = "method")]
    pub attack_method: AttackMethod,
    /// Simulated packet size in bytes.
    #[validate(range(min = 1, message = "packetSize must be at least 1"))]
    pub packet_size: u32,
    /// Planned run length in seconds.
    #[validate(range(min = 1, max = 300, message = "duration must be between 1 and 300"))]
    pub duration: u32,
    /// Number of requests to simulate.
    #[validate(range(min = 1, message = "totalRequests must be at least 1"))]
    pub total_requests: u64,
    /// Initial status; `pending` when omitted.
    #[serde(default)]
    pub status: Option<TestStatus>,
    /// Start time; stamped by the store when omitted.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// End time, normally absent at creation.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

/// Request body for a status change on an existing test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatusUpdate {
    /// The replacement status.
    pub status: TestStatus,
}

// ---------------------------------------------------------------------------
// Traffic log
// ---------------------------------------------------------------------------

/// One sampled tick of simulated traffic for a test. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TrafficLog {
    /// Store-assigned identifier.
    pub id: TrafficLogId,
    /// The test this sample belongs to.
    pub test_id: TestId,
    /// When the sample was taken.
    pub timestamp: DateTime<Utc>,
    /// Packets the producer claims to have sent in this tick.
    pub packets_sent: u64,
    /// Packets the producer claims came back.
    pub packets_received: u64,
    /// Simulated response time in milliseconds.
    pub response_time: u32,
    /// Claimed source address.
    pub source_ip: String,
    /// Claimed destination address.
    pub destination_ip: String,
}

/// Insert shape for a [`TrafficLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NewTrafficLog {
    /// The test this sample belongs to.
    pub test_id: TestId,
    /// Sample time; stamped by the store when omitted.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Packets sent in this tick.
    pub packets_sent: u64,
    /// Packets received in this tick.
    pub packets_received: u64,
    /// Response time in milliseconds.
    pub response_time: u32,
    /// Source address.
    #[validate(length(min = 1, message = "sourceIp must not be empty"))]
    pub source_ip: String,
    /// Destination address.
    #[validate(length(min = 1, message = "destinationIp must not be empty"))]
    pub destination_ip: String,
}
