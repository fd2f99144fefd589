//! Enumeration types shared by the store, the API, and the viewer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Attack method
// ---------------------------------------------------------------------------

/// The simulated flood technique a test pretends to use.
///
/// Purely descriptive: no packets are ever sent. The wire names match the
/// labels the dashboard shows in its method picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AttackMethod {
    /// Connectionless datagram flood.
    #[serde(rename = "UDP Flood")]
    UdpFlood,
    /// Half-open TCP handshake flood.
    #[serde(rename = "SYN Flood")]
    SynFlood,
    /// Application-layer request flood.
    #[serde(rename = "HTTP Flood")]
    HttpFlood,
}

impl AttackMethod {
    /// Every supported method, in the order the dashboard lists them.
    pub const ALL: [Self; 3] = [Self::UdpFlood, Self::SynFlood, Self::HttpFlood];

    /// The wire label for this method.
    pub const fn label(self) -> &'static str {
        match self {
            Self::UdpFlood => "UDP Flood",
            Self::SynFlood => "SYN Flood",
            Self::HttpFlood => "HTTP Flood",
        }
    }
}

impl core::fmt::Display for AttackMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Test status
// ---------------------------------------------------------------------------

/// Lifecycle state of a simulated attack run.
///
/// The expected progression is `pending -> running -> completed | failed`,
/// driven by whichever producer is fabricating the traffic. Nothing moves a
/// test forward on its own: a test whose producer disappears stays in
/// `running` indefinitely.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum TestStatus {
    /// Created but not yet started.
    #[default]
    Pending,
    /// Traffic samples are being produced.
    Running,
    /// Finished normally.
    Completed,
    /// Aborted by the producer.
    Failed,
}

impl TestStatus {
    /// Whether the run has finished, successfully or not.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// The lower-case wire name of this status.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl core::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attack_method_uses_dashboard_labels() {
        for method in AttackMethod::ALL {
            let json = serde_json::to_string(&method).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", method.label()));
        }
        let parsed: Result<AttackMethod, _> = serde_json::from_str("\"SYN Flood\"");
        assert_eq!(parsed.ok(), Some(AttackMethod::SynFlood));
    }

    #[test]
    fn unknown_attack_method_is_rejected() {
        let parsed: Result<AttackMethod, _> = serde_json::from_str("\"Ping of Death\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn status_is_lowercase_on_the_wire() {
        let json = serde_json::to_string(&TestStatus::Running).unwrap_or_default();
        assert_eq!(json, "\"running\"");
        assert_eq!(TestStatus::default(), TestStatus::Pending);
    }

    #[test]
    fn terminal_states() {
        assert!(!TestStatus::Pending.is_terminal());
        assert!(!TestStatus::Running.is_terminal());
        assert!(TestStatus::Completed.is_terminal());
        assert!(TestStatus::Failed.is_terminal());
    }
}
