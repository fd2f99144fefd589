//! Realtime channel envelopes.
//!
//! Every frame on the realtime channel is a JSON object tagged by `type`.
//! Inbound frames carry their body under `payload`; outbound record pushes
//! carry it under `data`; errors carry a `message` string.
//!
//! ```text
//! viewer -> server   { "type": "NEW_LOG",      "payload": { ...NewTrafficLog } }
//! server -> viewers  { "type": "NEW_LOG",      "data":    { ...TrafficLog } }
//! server -> viewers  { "type": "NEW_TEST",     "data":    { ...DdosTest } }
//! server -> viewers  { "type": "TEST_UPDATED", "data":    { ...DdosTest } }
//! server -> sender   { "type": "ERROR",        "message": "..." }
//! ```
//!
//! Pushed records carry no sequence number. A viewer that connects late or
//! drops a frame cannot tell; it must pull history over HTTP first and then
//! merge pushes by record id.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::{DdosTest, NewTrafficLog, TrafficLog};

/// A frame sent by a viewer or producer to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum ClientMessage {
    /// Submit one traffic sample for persistence and fan-out.
    NewLog(NewTrafficLog),
}

impl ClientMessage {
    /// The wire tag of this message.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NewLog(_) => "NEW_LOG",
        }
    }
}

/// A frame pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum ServerMessage {
    /// A traffic sample was stored.
    NewLog {
        /// The stored sample, including its assigned id.
        data: TrafficLog,
    },
    /// A test was created through the HTTP API.
    NewTest {
        /// The stored test.
        data: DdosTest,
    },
    /// A test's status was replaced through the HTTP API.
    TestUpdated {
        /// The test after the update.
        data: DdosTest,
    },
    /// The sender's last frame was rejected. Never broadcast.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

impl ServerMessage {
    /// The wire tag of this message.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NewLog { .. } => "NEW_LOG",
            Self::NewTest { .. } => "NEW_TEST",
            Self::TestUpdated { .. } => "TEST_UPDATED",
            Self::Error { .. } => "ERROR",
        }
    }

    /// Build an error frame.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_new_log_decodes_from_payload() {
        let frame = serde_json::json!({
            "type": "NEW_LOG",
            "payload": {
                "testId": 1,
                "packetsSent": 50,
                "packetsReceived": 48,
                "responseTime": 20,
                "sourceIp": "x",
                "destinationIp": "1.1.1.1",
            }
        });
        let parsed: Result<ClientMessage, _> = serde_json::from_value(frame);
        let msg = parsed.ok();
        assert_eq!(msg.as_ref().map(ClientMessage::kind), Some("NEW_LOG"));
        assert!(matches!(msg, Some(ClientMessage::NewLog(ref log)) if log.packets_sent == 50));
    }

    #[test]
    fn unknown_inbound_type_is_rejected() {
        let frame = serde_json::json!({ "type": "DROP_TABLES", "payload": {} });
        let parsed: Result<ClientMessage, _> = serde_json::from_value(frame);
        assert!(parsed.is_err());
    }

    #[test]
    fn error_frame_shape() {
        let json = serde_json::to_value(ServerMessage::error("bad frame")).unwrap_or_default();
        assert_eq!(json["type"], "ERROR");
        assert_eq!(json["message"], "bad frame");
        assert!(json.get("data").is_none());
    }
}
