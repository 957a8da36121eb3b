//! # Core Entities
//!
//! Typed identifiers and the timestamp type used throughout the workspace.

use crate::errors::IdParseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Wall-clock timestamp (UTC).
pub type Timestamp = DateTime<Utc>;

/// Longest input echoed back inside a parse error.
const MAX_ECHOED_INPUT: usize = 64;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse a caller-supplied identifier.
            ///
            /// Rejects malformed input and the nil UUID.
            pub fn parse(input: &str) -> Result<Self, IdParseError> {
                let uuid = Uuid::parse_str(input.trim()).map_err(|_| IdParseError::Malformed {
                    kind: $kind,
                    input: input.chars().take(MAX_ECHOED_INPUT).collect(),
                })?;
                if uuid.is_nil() {
                    return Err(IdParseError::Nil { kind: $kind });
                }
                Ok(Self(uuid))
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Raw big-endian bytes, used for storage keys.
            #[must_use]
            pub fn as_bytes(&self) -> &[u8; 16] {
                self.0.as_bytes()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

define_id!(
    /// Identifier of an authenticated user (supplied by the upstream gateway).
    UserId,
    "user"
);

define_id!(
    /// Identifier of a document, assigned at creation.
    DocumentId,
    "document"
);

define_id!(
    /// Identifier of a notification, assigned at creation.
    NotificationId,
    "notification"
);
