//! Collations for string-valued columns
//!
//! A collation defines the total order and the equality rule used for string
//! values. Every collation works by mapping a byte string to a sort key;
//! two strings compare exactly like their sort keys do.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Character set and collation of a string column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Collation {
    /// Raw byte order
    #[default]
    #[serde(rename = "binary")]
    Binary,
    /// UTF-8 payload compared by code units
    #[serde(rename = "utf8mb4_bin")]
    Utf8Bin,
    /// ASCII letters fold to lower case, other bytes compare raw
    #[serde(rename = "ascii_general_ci")]
    AsciiGeneralCi,
    /// Unicode lower-case folding of the UTF-8 decoded payload
    #[serde(rename = "utf8mb4_general_ci")]
    Utf8GeneralCi,
}

impl Collation {
    /// All supported collations
    pub const ALL: [Collation; 4] = [
        Collation::Binary,
        Collation::Utf8Bin,
        Collation::AsciiGeneralCi,
        Collation::Utf8GeneralCi,
    ];

    /// Name used in persisted documents
    pub fn name(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Utf8Bin => "utf8mb4_bin",
            Self::AsciiGeneralCi => "ascii_general_ci",
            Self::Utf8GeneralCi => "utf8mb4_general_ci",
        }
    }

    /// Look up a collation by its persisted name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Whether strings that differ only in letter case compare equal
    pub fn is_case_insensitive(&self) -> bool {
        matches!(self, Self::AsciiGeneralCi | Self::Utf8GeneralCi)
    }

    /// Map a byte string to the key it sorts by
    pub fn sort_key<'a>(&self, bytes: &'a [u8]) -> Cow<'a, [u8]> {
        match self {
            Self::Binary | Self::Utf8Bin => Cow::Borrowed(bytes),
            Self::AsciiGeneralCi => {
                if bytes.iter().any(u8::is_ascii_uppercase) {
                    Cow::Owned(bytes.to_ascii_lowercase())
                } else {
                    Cow::Borrowed(bytes)
                }
            }
            Self::Utf8GeneralCi => {
                Cow::Owned(String::from_utf8_lossy(bytes).to_lowercase().into_bytes())
            }
        }
    }

    /// Compare two byte strings under this collation
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        match self {
            Self::Binary | Self::Utf8Bin => a.cmp(b),
            _ => self.sort_key(a).cmp(&self.sort_key(b)),
        }
    }
}

impl fmt::Display for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collation {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::from_name(s)
            .ok_or_else(|| crate::Error::malformed(format_args!("unknown collation '{s}'")))
    }
}
