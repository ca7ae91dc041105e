//! Shareable file records.

use crate::ContentHash;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies shareable content. The hash is the key; the name is for humans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    pub content_hash: ContentHash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// How a user refers to content on the command line: a hash or a local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRef {
    Hash(ContentHash),
    Name(String),
}

impl FileRef {
    /// Interpret `input` as a content hash when it parses as one, otherwise as a name.
    pub fn parse(input: &str) -> Self {
        match input.parse() {
            Ok(hash) => Self::Hash(hash),
            Err(_) => Self::Name(input.to_string()),
        }
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hash(hash) => write!(f, "{hash}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_ref_parse() {
        let hex = "11".repeat(32);
        assert!(matches!(FileRef::parse(&hex), FileRef::Hash(_)));
        assert_eq!(
            FileRef::parse("report.pdf"),
            FileRef::Name("report.pdf".to_string())
        );
    }
}
