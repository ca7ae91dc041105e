//! Content hash type.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// Length of a content hash in bytes.
pub const HASH_LEN: usize = 32;

/// SHA-256 digest of a file's content, rendered as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; HASH_LEN]);

/// Errors when parsing a [`ContentHash`] from text.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ContentHashError {
    /// Input was not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Input decoded to the wrong number of bytes.
    #[error("expected {HASH_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

impl ContentHash {
    pub const fn new(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; HASH_LEN]> for ContentHash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for ContentHash {
    type Err = ContentHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim().trim_start_matches("0x"))?;
        let len = bytes.len();
        let bytes: [u8; HASH_LEN] = bytes
            .try_into()
            .map_err(|_| ContentHashError::InvalidLength(len))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    #[test]
    fn test_parse_and_display() {
        let hash: ContentHash = SAMPLE.parse().unwrap();
        assert_eq!(hash.to_string(), SAMPLE);
        assert_eq!(hash.as_bytes()[0], 0x9f);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            "report.pdf".parse::<ContentHash>(),
            Err(ContentHashError::InvalidHex(_))
        ));
        assert_eq!(
            "abcd".parse::<ContentHash>(),
            Err(ContentHashError::InvalidLength(2))
        );
    }

    #[test]
    fn test_serde_as_hex_string() {
        let hash: ContentHash = SAMPLE.parse().unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{SAMPLE}\""));
    }
}
