//! Shared type definitions for the DDoS simulator.
//!
//! Every record that crosses a crate or network boundary is defined here.
//! Viewer-facing types derive `ts-rs` so the dashboard can import matching
//! `TypeScript` definitions.
//!
//! # Modules
//!
//! - [`ids`] -- Per-type numeric identifiers
//! - [`enums`] -- Attack methods and test status
//! - [`structs`] -- Stored records and their insert shapes
//! - [`messages`] -- Realtime channel envelopes

pub mod enums;
pub mod ids;
pub mod messages;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AttackMethod, TestStatus};
pub use ids::{AccountId, ServerId, TestId, TrafficLogId};
pub use messages::{ClientMessage, ServerMessage};
pub use structs::{
    Account, Credentials, DdosTest, MAX_TEST_DURATION_SECS, NewAccount, NewDdosTest,
    NewTargetServer, NewTrafficLog, PublicAccount, StatusUpdate, TargetServer, TrafficLog,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the dashboard.

    #[test]
    fn export_bindings() {
        // Files land in `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::AccountId::export_all();
        let _ = crate::ids::ServerId::export_all();
        let _ = crate::ids::TestId::export_all();
        let _ = crate::ids::TrafficLogId::export_all();

        let _ = crate::enums::AttackMethod::export_all();
        let _ = crate::enums::TestStatus::export_all();

        let _ = crate::structs::PublicAccount::export_all();
        let _ = crate::structs::TargetServer::export_all();
        let _ = crate::structs::NewTargetServer::export_all();
        let _ = crate::structs::DdosTest::export_all();
        let _ = crate::structs::NewDdosTest::export_all();
        let _ = crate::structs::StatusUpdate::export_all();
        let _ = crate::structs::TrafficLog::export_all();
        let _ = crate::structs::NewTrafficLog::export_all();

        let _ = crate::messages::ClientMessage::export_all();
        let _ = crate::messages::ServerMessage::export_all();
    }
}
