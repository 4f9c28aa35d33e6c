use serde::{Deserialize, Serialize};
use std::fmt;

/// Statistics Canada product identifier. Newtyped so it can't be confused with a
/// member id or dimension position, all of which are also plain integers upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// First 12 hex characters of a SHA-256 digest. Used as the content-address for
/// every artifact family and as the identifier for a canonical dimension shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hash12(String);

impl Hash12 {
    pub const LEN: usize = 12;

    /// Truncates a full hex digest (or any hex string) to the canonical 12-char prefix.
    ///
    /// Panics if `hex_digest` is shorter than `LEN`; callers always pass a full
    /// SHA-256 hex digest (64 chars), so this is a programmer-error guard, not a
    /// recoverable condition.
    pub fn from_full_hex(hex_digest: &str) -> Self {
        assert!(
            hex_digest.len() >= Self::LEN,
            "digest too short to derive a {}-char hash prefix: {hex_digest}",
            Self::LEN
        );
        Self(hex_digest[..Self::LEN].to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-character fanout prefix used for content-store directory sharding.
    pub fn fanout_prefix(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for Hash12 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Hash12 {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_to_twelve_chars() {
        let digest = "abc123def456789000";
        let hash = Hash12::from_full_hex(digest);
        assert_eq!(hash.as_str(), "abc123def456");
        assert_eq!(hash.fanout_prefix(), "ab");
    }

    #[test]
    fn lowercases_input() {
        let hash = Hash12::from_full_hex("ABC123DEF456789000");
        assert_eq!(hash.as_str(), "abc123def456");
    }
}
