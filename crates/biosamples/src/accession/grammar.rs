//! Accession strings: an uppercase alphabetic prefix followed by digits.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BioSamplesError, Result};

static ACCESSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]+[0-9]+$").expect("accession pattern is valid"));

/// A validated accession such as `SAMEA1234567`.
///
/// The prefix and the digit run (with any zero padding) are recoverable
/// separately and re-join to the original string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Accession {
    value: String,
    split: usize,
}

impl Accession {
    /// Parse and validate an accession string.
    pub fn parse(value: &str) -> Result<Self> {
        if !ACCESSION_PATTERN.is_match(value) {
            return Err(BioSamplesError::InvalidAccession(value.to_string()));
        }
        let split = value
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| BioSamplesError::InvalidAccession(value.to_string()))?;

        Ok(Self {
            value: value.to_string(),
            split,
        })
    }

    /// Build an accession from a prefix and sequence number.
    pub fn from_parts(prefix: &str, number: u64) -> Result<Self> {
        Self::parse(&format!("{}{}", prefix, number))
    }

    /// Whether `value` matches the accession grammar.
    pub fn is_valid(value: &str) -> bool {
        ACCESSION_PATTERN.is_match(value)
    }

    /// Alphabetic prefix.
    pub fn prefix(&self) -> &str {
        &self.value[..self.split]
    }

    /// Numeric suffix exactly as written, including leading zeros.
    pub fn digits(&self) -> &str {
        &self.value[self.split..]
    }

    /// Numeric suffix as a number, if it fits in a `u64`.
    pub fn number(&self) -> Option<u64> {
        self.digits().parse().ok()
    }

    /// Split into `(prefix, digits)`.
    pub fn split(&self) -> (&str, &str) {
        self.value.split_at(self.split)
    }

    /// The full accession string.
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Accession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Accession {
    type Err = BioSamplesError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Accession {
    type Error = BioSamplesError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Accession> for String {
    fn from(accession: Accession) -> Self {
        accession.value
    }
}

impl AsRef<str> for Accession {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_split() {
        let acc = Accession::parse("SAMEA0001234").unwrap();
        assert_eq!(acc.prefix(), "SAMEA");
        assert_eq!(acc.digits(), "0001234");
        assert_eq!(acc.number(), Some(1234));
        assert_eq!(acc.split(), ("SAMEA", "0001234"));
        assert_eq!(acc.to_string(), "SAMEA0001234");
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "SAMEA", "12345", "samea1", "SAMEA12X", " SAMEA1", "SAM_EA1", "PRJNA-1"] {
            assert!(Accession::parse(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_from_parts() {
        let acc = Accession::from_parts("ERS", 42).unwrap();
        assert_eq!(acc.as_str(), "ERS42");
        assert!(Accession::from_parts("ers", 42).is_err());
    }

    #[test]
    fn test_oversized_number_still_valid() {
        let acc = Accession::parse("SAMEA99999999999999999999999").unwrap();
        assert_eq!(acc.number(), None);
        assert_eq!(acc.digits().len(), 23);
    }

    #[test]
    fn test_serde_as_string() {
        let acc: Accession = serde_json::from_str("\"SAMEG7\"").unwrap();
        assert_eq!(acc.prefix(), "SAMEG");
        assert!(serde_json::from_str::<Accession>("\"7SAMEG\"").is_err());
        assert_eq!(serde_json::to_string(&acc).unwrap(), "\"SAMEG7\"");
    }
}
