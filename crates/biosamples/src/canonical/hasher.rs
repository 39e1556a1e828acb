//! Framed SHA-256 hashing over canonical field sequences.
//!
//! Every value written to a [`CanonicalHasher`] is framed with a one-byte
//! kind tag and, for variable-length data, a big-endian length prefix. Two
//! different field sequences can therefore never produce the same byte
//! stream, whatever characters the fields contain.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{BioSamplesError, Result};

static HASH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-f]{64}$").expect("hash pattern is valid"));

const TAG_STRING: u8 = b'S';
const TAG_ABSENT: u8 = b'N';
const TAG_COUNT: u8 = b'C';
const TAG_NUMBER: u8 = b'I';

/// A SHA-256 digest rendered as lowercase hex.
///
/// Used as the primary key of content-addressed objects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Parse a lowercase hex digest.
    pub fn parse(value: &str) -> Result<Self> {
        if HASH_PATTERN.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(BioSamplesError::InvalidHash(value.to_string()))
        }
    }

    /// The hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = BioSamplesError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

/// Incremental hasher over framed canonical fields.
#[derive(Clone, Default)]
pub struct CanonicalHasher {
    inner: Sha256,
}

impl CanonicalHasher {
    /// Create an empty hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one string field.
    pub fn field(&mut self, value: &str) -> &mut Self {
        self.inner.update([TAG_STRING]);
        self.inner.update((value.len() as u64).to_be_bytes());
        self.inner.update(value.as_bytes());
        self
    }

    /// Write a field that may be absent. Absent and empty are distinct.
    pub fn optional(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(value) => self.field(value),
            None => {
                self.inner.update([TAG_ABSENT]);
                self
            }
        }
    }

    /// Write the element count of the collection that follows.
    pub fn count(&mut self, len: usize) -> &mut Self {
        self.inner.update([TAG_COUNT]);
        self.inner.update((len as u64).to_be_bytes());
        self
    }

    /// Write an unsigned number.
    pub fn number(&mut self, value: u64) -> &mut Self {
        self.inner.update([TAG_NUMBER]);
        self.inner.update(value.to_be_bytes());
        self
    }

    /// Write a count-prefixed sequence of string fields.
    pub fn fields<'a, I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a str>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        self.count(values.len());
        for value in values {
            self.field(value);
        }
        self
    }

    /// Consume the hasher and produce the digest.
    pub fn finish(self) -> ContentHash {
        ContentHash(format!("{:x}", self.inner.finalize()))
    }
}

/// Types that can write themselves into a [`CanonicalHasher`].
pub trait Canonical {
    /// Write this value's canonical field sequence.
    fn write_canonical(&self, hasher: &mut CanonicalHasher);

    /// Hash this value on its own.
    fn content_hash(&self) -> ContentHash {
        let mut hasher = CanonicalHasher::new();
        self.write_canonical(&mut hasher);
        hasher.finish()
    }
}

/// Write a count-prefixed, already-ordered collection of canonical values.
pub fn write_set<'a, T, I>(hasher: &mut CanonicalHasher, items: I)
where
    T: Canonical + 'a,
    I: IntoIterator<Item = &'a T>,
    I::IntoIter: ExactSizeIterator,
{
    let items = items.into_iter();
    hasher.count(items.len());
    for item in items {
        item.write_canonical(hasher);
    }
}
