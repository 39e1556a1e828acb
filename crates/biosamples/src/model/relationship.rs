//! Relationships between records.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::canonical::{Canonical, CanonicalHasher};

/// A typed edge `source -[type]-> target`.
///
/// The source may be absent on records that have not been accessioned yet;
/// it is filled in with the new accession on first allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(rename = "type")]
    pub relationship_type: String,

    pub target: String,
}

impl Relationship {
    /// Create a relationship with an explicit source.
    pub fn new(
        source: impl Into<String>,
        relationship_type: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: Some(source.into()),
            relationship_type: relationship_type.into(),
            target: target.into(),
        }
    }

    /// Create a relationship whose source is the (not yet accessioned) record itself.
    pub fn unsourced(relationship_type: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: None,
            relationship_type: relationship_type.into(),
            target: target.into(),
        }
    }

    /// Whether the source is absent or blank.
    pub fn has_blank_source(&self) -> bool {
        self.source.as_deref().is_none_or(|s| s.trim().is_empty())
    }

    /// Whether `accession` is the source of this relationship.
    pub fn is_owned_by(&self, accession: &str) -> bool {
        self.source.as_deref() == Some(accession)
    }

    /// Copy with the given source.
    pub fn with_source(&self, source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..self.clone()
        }
    }
}

impl Ord for Relationship {
    /// Type, then target, then source; an absent source sorts last.
    fn cmp(&self, other: &Self) -> Ordering {
        self.relationship_type
            .cmp(&other.relationship_type)
            .then_with(|| self.target.cmp(&other.target))
            .then_with(|| match (&self.source, &other.source) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

impl PartialOrd for Relationship {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Canonical for Relationship {
    fn write_canonical(&self, hasher: &mut CanonicalHasher) {
        hasher
            .optional(self.source.as_deref())
            .field(&self.target)
            .field(&self.relationship_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_order_type_target_source_null_last() {
        let unsourced = Relationship::unsourced("has member", "SAMEA2");
        let sourced = Relationship::new("SAMEA1", "has member", "SAMEA2");
        let other_target = Relationship::new("SAMEA1", "has member", "SAMEA1");
        let derived = Relationship::new("SAMEA9", "derived from", "SAMEA5");

        let set: BTreeSet<_> = [unsourced.clone(), sourced.clone(), other_target.clone(), derived.clone()]
            .into_iter()
            .collect();

        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec![derived, other_target, sourced, unsourced]
        );
    }

    #[test]
    fn test_blank_source() {
        assert!(Relationship::unsourced("has member", "SAMEA2").has_blank_source());
        assert!(Relationship::new("  ", "has member", "SAMEA2").has_blank_source());
        assert!(!Relationship::new("SAMEA1", "has member", "SAMEA2").has_blank_source());
    }

    #[test]
    fn test_with_source() {
        let rel = Relationship::unsourced("derived from", "SAMEA7").with_source("SAMEA3");
        assert!(rel.is_owned_by("SAMEA3"));
        assert_eq!(rel.target, "SAMEA7");
    }
}
