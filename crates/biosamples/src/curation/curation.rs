//! Content-addressed curations: pre/post change sets over a sample.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canonical::{write_set, CanonicalHasher, ContentHash};
use crate::error::{BioSamplesError, Result};
use crate::model::{Attribute, ExternalReference, Relationship, Sample};

/// A proposed change to a sample's attributes, external references and
/// relationships.
///
/// The hash is computed from the six sorted sets and is the curation's
/// identity: building the same sets in any order yields the same hash, so
/// repeated submissions of one curation collapse to a single object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CurationRepr", into = "CurationRepr")]
pub struct Curation {
    attributes_pre: BTreeSet<Attribute>,
    attributes_post: BTreeSet<Attribute>,
    external_references_pre: BTreeSet<ExternalReference>,
    external_references_post: BTreeSet<ExternalReference>,
    relationships_pre: BTreeSet<Relationship>,
    relationships_post: BTreeSet<Relationship>,
    hash: ContentHash,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurationRepr {
    #[serde(default)]
    attributes_pre: BTreeSet<Attribute>,
    #[serde(default)]
    attributes_post: BTreeSet<Attribute>,
    #[serde(default)]
    external_references_pre: BTreeSet<ExternalReference>,
    #[serde(default)]
    external_references_post: BTreeSet<ExternalReference>,
    #[serde(default)]
    relationships_pre: BTreeSet<Relationship>,
    #[serde(default)]
    relationships_post: BTreeSet<Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hash: Option<ContentHash>,
}

impl Curation {
    /// Build a curation from unordered collections.
    ///
    /// Duplicates are dropped and each collection is sorted before hashing,
    /// in the order attributes pre/post, external references pre/post,
    /// relationships pre/post.
    pub fn build<AP, AQ, EP, EQ, RP, RQ>(
        attributes_pre: AP,
        attributes_post: AQ,
        external_references_pre: EP,
        external_references_post: EQ,
        relationships_pre: RP,
        relationships_post: RQ,
    ) -> Self
    where
        AP: IntoIterator<Item = Attribute>,
        AQ: IntoIterator<Item = Attribute>,
        EP: IntoIterator<Item = ExternalReference>,
        EQ: IntoIterator<Item = ExternalReference>,
        RP: IntoIterator<Item = Relationship>,
        RQ: IntoIterator<Item = Relationship>,
    {
        Self::from_sets(
            attributes_pre.into_iter().collect(),
            attributes_post.into_iter().collect(),
            external_references_pre.into_iter().collect(),
            external_references_post.into_iter().collect(),
            relationships_pre.into_iter().collect(),
            relationships_post.into_iter().collect(),
        )
    }

    /// Build an attribute-only curation.
    pub fn attributes<P, Q>(pre: P, post: Q) -> Self
    where
        P: IntoIterator<Item = Attribute>,
        Q: IntoIterator<Item = Attribute>,
    {
        Self::build(pre, post, [], [], [], [])
    }

    fn from_sets(
        attributes_pre: BTreeSet<Attribute>,
        attributes_post: BTreeSet<Attribute>,
        external_references_pre: BTreeSet<ExternalReference>,
        external_references_post: BTreeSet<ExternalReference>,
        relationships_pre: BTreeSet<Relationship>,
        relationships_post: BTreeSet<Relationship>,
    ) -> Self {
        let mut hasher = CanonicalHasher::new();
        write_set(&mut hasher, &attributes_pre);
        write_set(&mut hasher, &attributes_post);
        write_set(&mut hasher, &external_references_pre);
        write_set(&mut hasher, &external_references_post);
        write_set(&mut hasher, &relationships_pre);
        write_set(&mut hasher, &relationships_post);

        Self {
            attributes_pre,
            attributes_post,
            external_references_pre,
            external_references_post,
            relationships_pre,
            relationships_post,
            hash: hasher.finish(),
        }
    }

    /// Content hash; the curation's primary key.
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    pub fn attributes_pre(&self) -> &BTreeSet<Attribute> {
        &self.attributes_pre
    }

    pub fn attributes_post(&self) -> &BTreeSet<Attribute> {
        &self.attributes_post
    }

    pub fn external_references_pre(&self) -> &BTreeSet<ExternalReference> {
        &self.external_references_pre
    }

    pub fn external_references_post(&self) -> &BTreeSet<ExternalReference> {
        &self.external_references_post
    }

    pub fn relationships_pre(&self) -> &BTreeSet<Relationship> {
        &self.relationships_pre
    }

    pub fn relationships_post(&self) -> &BTreeSet<Relationship> {
        &self.relationships_post
    }

    /// Whether the curation changes nothing.
    pub fn is_empty(&self) -> bool {
        self.attributes_pre.is_empty()
            && self.attributes_post.is_empty()
            && self.external_references_pre.is_empty()
            && self.external_references_post.is_empty()
            && self.relationships_pre.is_empty()
            && self.relationships_post.is_empty()
    }

    /// Apply this curation to a sample.
    ///
    /// Every "pre" element must be present and no "post" element may already
    /// be present once the "pre" elements are removed; otherwise the curation
    /// does not apply and `None` is returned.
    pub fn apply_to(&self, sample: &Sample) -> Option<Sample> {
        let attributes = swap(&sample.attributes, &self.attributes_pre, &self.attributes_post)?;
        let external_references = swap(
            &sample.external_references,
            &self.external_references_pre,
            &self.external_references_post,
        )?;
        let relationships = swap(
            &sample.relationships,
            &self.relationships_pre,
            &self.relationships_post,
        )?;

        Some(Sample {
            attributes,
            external_references,
            relationships,
            ..sample.clone()
        })
    }
}

fn swap<T: Ord + Clone>(
    current: &BTreeSet<T>,
    pre: &BTreeSet<T>,
    post: &BTreeSet<T>,
) -> Option<BTreeSet<T>> {
    if !pre.is_subset(current) {
        return None;
    }
    let remaining: BTreeSet<T> = current.difference(pre).cloned().collect();
    if !remaining.is_disjoint(post) {
        return None;
    }
    Some(remaining.union(post).cloned().collect())
}

/// Apply curations repeatedly until no more can be applied.
///
/// Returns the curated sample and the curations that never applied.
pub fn apply_all<'a>(sample: &Sample, curations: &'a [Curation]) -> (Sample, Vec<&'a Curation>) {
    let mut current = sample.clone();
    let mut pending: Vec<&Curation> = curations.iter().collect();

    loop {
        let before = pending.len();
        pending.retain(|curation| match curation.apply_to(&current) {
            Some(next) => {
                current = next;
                false
            }
            None => true,
        });
        if pending.is_empty() || pending.len() == before {
            break;
        }
    }

    if !pending.is_empty() {
        debug!(unapplied = pending.len(), "Curations left unapplied");
    }
    (current, pending)
}

impl TryFrom<CurationRepr> for Curation {
    type Error = BioSamplesError;

    fn try_from(repr: CurationRepr) -> Result<Self> {
        let curation = Self::from_sets(
            repr.attributes_pre,
            repr.attributes_post,
            repr.external_references_pre,
            repr.external_references_post,
            repr.relationships_pre,
            repr.relationships_post,
        );
        match repr.hash {
            Some(claimed) if claimed != curation.hash => Err(BioSamplesError::InvalidHash(format!(
                "{} does not match curation content ({})",
                claimed, curation.hash
            ))),
            _ => Ok(curation),
        }
    }
}

impl From<Curation> for CurationRepr {
    fn from(curation: Curation) -> Self {
        Self {
            attributes_pre: curation.attributes_pre,
            attributes_post: curation.attributes_post,
            external_references_pre: curation.external_references_pre,
            external_references_post: curation.external_references_post,
            relationships_pre: curation.relationships_pre,
            relationships_post: curation.relationships_post,
            hash: Some(curation.hash),
        }
    }
}
