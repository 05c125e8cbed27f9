//! Content digests of routine bodies and their pinned expectations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// SHA-256 digest of a routine's compiled body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Uppercase hex, 64 characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The digest a routine body is expected to have.
///
/// An empty pin means the routine has not been pinned yet; verification then
/// only reports the computed digest and never flags a mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExpectedDigest {
    #[default]
    Unpinned,
    Pinned(String),
}

impl ExpectedDigest {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Self::Unpinned
        } else {
            Self::Pinned(trimmed.to_string())
        }
    }

    #[must_use]
    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Pinned(_))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unpinned => "",
            Self::Pinned(hex) => hex,
        }
    }

    /// Compare a computed hex digest against this pin, ignoring ASCII case.
    #[must_use]
    pub fn compare(&self, actual_hex: &str) -> DigestComparison {
        match self {
            Self::Unpinned => DigestComparison::Unpinned,
            Self::Pinned(expected) if expected.eq_ignore_ascii_case(actual_hex) => {
                DigestComparison::Match
            }
            Self::Pinned(_) => DigestComparison::Mismatch,
        }
    }
}

impl From<String> for ExpectedDigest {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for ExpectedDigest {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<ExpectedDigest> for String {
    fn from(value: ExpectedDigest) -> Self {
        match value {
            ExpectedDigest::Unpinned => String::new(),
            ExpectedDigest::Pinned(hex) => hex,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestComparison {
    Match,
    Mismatch,
    Unpinned,
}
