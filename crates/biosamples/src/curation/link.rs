//! Links attaching a curation to a sample.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accession::Accession;
use crate::canonical::{CanonicalHasher, ContentHash};
use crate::error::{BioSamplesError, Result};
use crate::model::Owner;

use super::curation::Curation;

/// A curator's attachment of one curation to one sample.
///
/// Identified by `H(curation hash ‖ sample accession)`, so attaching the
/// same curation to the same sample twice yields the same link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CurationLinkRepr", into = "CurationLinkRepr")]
pub struct CurationLink {
    sample: Accession,
    curation: ContentHash,
    owner: Owner,
    created: DateTime<Utc>,
    hash: ContentHash,
}

#[derive(Serialize, Deserialize)]
struct CurationLinkRepr {
    sample: Accession,
    curation: ContentHash,
    owner: Owner,
    created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hash: Option<ContentHash>,
}

impl CurationLink {
    /// Link `curation` to `sample` on behalf of `owner`.
    pub fn new(sample: Accession, curation: &Curation, owner: Owner, created: DateTime<Utc>) -> Self {
        Self::from_hash(sample, curation.hash().clone(), owner, created)
    }

    /// Link by curation hash.
    pub fn from_hash(
        sample: Accession,
        curation: ContentHash,
        owner: Owner,
        created: DateTime<Utc>,
    ) -> Self {
        let hash = link_hash(&curation, &sample);
        Self {
            sample,
            curation,
            owner,
            created,
            hash,
        }
    }

    /// Accession of the curated sample.
    pub fn sample(&self) -> &Accession {
        &self.sample
    }

    /// Hash of the attached curation.
    pub fn curation(&self) -> &ContentHash {
        &self.curation
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Link identity.
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }
}

/// Identity of the link between a curation and a sample.
pub fn link_hash(curation: &ContentHash, sample: &Accession) -> ContentHash {
    let mut hasher = CanonicalHasher::new();
    hasher.field(curation.as_str()).field(sample.as_str());
    hasher.finish()
}

impl TryFrom<CurationLinkRepr> for CurationLink {
    type Error = BioSamplesError;

    fn try_from(repr: CurationLinkRepr) -> Result<Self> {
        let link = Self::from_hash(repr.sample, repr.curation, repr.owner, repr.created);
        match repr.hash {
            Some(claimed) if claimed != link.hash => Err(BioSamplesError::InvalidHash(format!(
                "{} does not match link {} -> {}",
                claimed, link.curation, link.sample
            ))),
            _ => Ok(link),
        }
    }
}

impl From<CurationLink> for CurationLinkRepr {
    fn from(link: CurationLink) -> Self {
        Self {
            sample: link.sample,
            curation: link.curation,
            owner: link.owner,
            created: link.created,
            hash: Some(link.hash),
        }
    }
}
