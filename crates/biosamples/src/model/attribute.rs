//! Sample attributes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::canonical::{Canonical, CanonicalHasher};

/// Attribute type that carries a sample's SRA accession.
pub const SRA_ACCESSION: &str = "SRA accession";

/// A typed attribute value with optional unit, tag and ontology IRIs.
///
/// Ordering is type, value, tag, IRI set, unit; an absent tag or unit sorts
/// before any present one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub attribute_type: String,

    #[serde(default)]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub iri: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Attribute {
    /// Create an attribute. Type and value are trimmed.
    pub fn new(attribute_type: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        Self {
            attribute_type: attribute_type.as_ref().trim().to_string(),
            value: value.as_ref().trim().to_string(),
            tag: None,
            iri: BTreeSet::new(),
            unit: None,
        }
    }

    /// Create the SRA accession attribute.
    pub fn sra_accession(value: impl AsRef<str>) -> Self {
        Self::new(SRA_ACCESSION, value)
    }

    /// Set the tag.
    pub fn with_tag(mut self, tag: impl AsRef<str>) -> Self {
        self.tag = Some(tag.as_ref().trim().to_string());
        self
    }

    /// Add an ontology IRI.
    pub fn with_iri(mut self, iri: impl Into<String>) -> Self {
        self.iri.insert(iri.into());
        self
    }

    /// Set the unit.
    pub fn with_unit(mut self, unit: impl AsRef<str>) -> Self {
        self.unit = Some(unit.as_ref().trim().to_string());
        self
    }

    /// Whether this attribute holds the sample's SRA accession.
    pub fn is_sra_accession(&self) -> bool {
        self.attribute_type == SRA_ACCESSION
    }
}

/// Canonical form: type, value, unit, sorted IRIs, then tag. The tag comes
/// last so that attributes differing only in tag never share a hash input.
impl Canonical for Attribute {
    fn write_canonical(&self, hasher: &mut CanonicalHasher) {
        hasher
            .field(&self.attribute_type)
            .field(&self.value)
            .optional(self.unit.as_deref())
            .fields(self.iri.iter().map(String::as_str))
            .optional(self.tag.as_deref());
    }
}
