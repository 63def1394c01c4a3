//! Strongly typed identifiers.
//!
//! Using the newtype pattern, these types prevent accidental misuse of
//! different ID types at compile time.
//!
//! # Example
//!
//! ```
//! use evescan_core::{ContractId, RegionId};
//!
//! let region = RegionId::new(10_000_002);
//! let contract = ContractId::new(212_590_551);
//!
//! // Type safety: cannot pass ContractId where RegionId is expected
//! fn requires_region(id: RegionId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_region(region);
//! // requires_region(contract); // This would not compile!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

/// Error type for ID parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The underlying integer parse error message.
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID over a remote-assigned i64.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier received from the remote API.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the underlying integer value.
            #[must_use]
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                s.parse::<i64>()
                    .map(Self)
                    .map_err(|e: ParseIntError| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

define_id! {
    /// Identifier of a trade region (one sync partition).
    RegionId
}

define_id! {
    /// Identifier of a public contract, unique within its region.
    ContractId
}
