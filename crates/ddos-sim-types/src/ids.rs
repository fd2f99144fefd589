//! Type-safe identifier wrappers around `u64`.
//!
//! Every record type has its own id space. Ids are handed out by the
//! entity store from a per-type counter starting at 1, so two records of
//! different types may share a numeric value but never a Rust type.
//! On the wire an id is a plain JSON number.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(#[ts(type = "number")] pub u64);

        impl $name {
            /// The first identifier assigned in a fresh store.
            pub const FIRST: Self = Self(1);

            /// Return the raw numeric value.
            pub const fn get(self) -> u64 {
                self.0
            }

            /// Return the identifier that follows this one, or `None` if
            /// the id space is exhausted.
            pub const fn next(self) -> Option<Self> {
                match self.0.checked_add(1) {
                    Some(n) => Some(Self(n)),
                    None => None,
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u64>().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of a registered user account.
    AccountId
}

define_id! {
    /// Identifier of a registered target server.
    ServerId
}

define_id! {
    /// Identifier of a simulated attack run.
    TestId
}

define_id! {
    /// Identifier of a single traffic log sample.
    TrafficLogId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_id_is_one() {
        assert_eq!(ServerId::FIRST.get(), 1);
        assert_eq!(TestId::FIRST, TestId::from(1));
    }

    #[test]
    fn next_increments_and_saturates() {
        assert_eq!(TrafficLogId(7).next(), Some(TrafficLogId(8)));
        assert_eq!(TrafficLogId(u64::MAX).next(), None);
    }

    #[test]
    fn id_serializes_as_plain_number() {
        let json = serde_json::to_string(&TestId(42)).ok();
        assert_eq!(json.as_deref(), Some("42"));
        let back: Result<TestId, _> = serde_json::from_str("42");
        assert_eq!(back.ok(), Some(TestId(42)));
    }

    #[test]
    fn id_parses_from_path_segment() {
        assert_eq!("12".parse::<ServerId>().ok(), Some(ServerId(12)));
        assert!("abc".parse::<ServerId>().is_err());
        assert!("-1".parse::<ServerId>().is_err());
    }
}
