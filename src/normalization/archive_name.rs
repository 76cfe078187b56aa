use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Archive filenames are a hex digest of this many digits, optionally followed
/// by a `_variant` suffix for regional or versioned copies of the same archive.
pub const ARCHIVE_HASH_LEN: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid archive name `{0}`: expected 32 hex digits with an optional `_variant` suffix")]
    InvalidArchiveName(String),
}

/// Structured catalog key for one archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveName {
    hash: String,
    variant: Option<String>,
}

impl ArchiveName {
    /// Parse a raw archive filename (no directory components).
    ///
    /// The digest is lowercased so `ABCD…` and `abcd…` resolve to the same
    /// archive; the variant is kept verbatim.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidArchiveName(raw.to_string());
        let trimmed = raw.trim();
        let (hash, variant) = match trimmed.split_once('_') {
            Some((hash, variant)) => (hash, Some(variant)),
            None => (trimmed, None),
        };

        if hash.len() != ARCHIVE_HASH_LEN || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        if let Some(variant) = variant {
            if variant.is_empty() || !variant.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid());
            }
        }

        Ok(Self {
            hash: hash.to_ascii_lowercase(),
            variant: variant.map(str::to_string),
        })
    }

    /// Rebuild a name from already-validated stored parts.
    pub(crate) fn from_parts(hash: String, variant: Option<String>) -> Self {
        Self { hash, variant }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }
}

impl FromStr for ArchiveName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "{}_{}", self.hash, variant),
            None => f.write_str(&self.hash),
        }
    }
}
