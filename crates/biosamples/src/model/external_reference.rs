//! External references to records in other archives.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::canonical::{normalize_reference_url, Canonical, CanonicalHasher, ContentHash};
use crate::error::{BioSamplesError, Result};

/// Base URL of Data Use Ontology terms.
pub const DUO_BASE_URL: &str = "http://purl.obolibrary.org/obo/";

/// Known archives, matched by URL fragment in this order.
const ARCHIVES: &[(&str, &str)] = &[
    ("www.ebi.ac.uk/ena", "ENA"),
    ("www.ebi.ac.uk/arrayexpress", "ArrayExpress"),
    ("hpscreg.eu/", "hPSCreg"),
    ("ncbi.nlm.nih.gov/projects/gap", "dbGaP"),
    ("ega-archive.org/datasets", "EGA Dataset"),
    ("ega-archive.org/metadata", "EGA Sample"),
    ("ega-archive.org/studies", "EGA Study"),
    ("ebi.ac.uk/biostudies", "BioStudies"),
    ("ebi.ac.uk/eva", "EVA"),
];

/// A normalised URL plus optional Data Use Ontology codes.
///
/// The hash is derived from the URL components and DUO codes and is never
/// serialised; it is recomputed when a reference is read back.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "ExternalReferenceRepr", into = "ExternalReferenceRepr")]
pub struct ExternalReference {
    url: String,
    duo: BTreeSet<String>,
    hash: ContentHash,
}

#[derive(Serialize, Deserialize)]
struct ExternalReferenceRepr {
    url: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    duo: BTreeSet<String>,
}

impl ExternalReference {
    /// Build a reference without DUO codes.
    pub fn new(url: &str) -> Result<Self> {
        Self::with_duo(url, std::iter::empty::<String>())
    }

    /// Build a reference carrying DUO codes.
    pub fn with_duo<I, S>(url: &str, duo: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let normalized = normalize_reference_url(url)?;
        let duo: BTreeSet<String> = duo.into_iter().map(Into::into).collect();

        let mut hasher = CanonicalHasher::new();
        normalized.write_canonical(&mut hasher);
        hasher.fields(duo.iter().map(String::as_str));

        Ok(Self {
            url: normalized.url,
            duo,
            hash: hasher.finish(),
        })
    }

    /// The normalised URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// DUO codes in sorted order.
    pub fn duo(&self) -> &BTreeSet<String> {
        &self.duo
    }

    /// Content hash over the URL components and DUO codes.
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Short archive name, or `"other"`.
    pub fn nickname(&self) -> &'static str {
        ARCHIVES
            .iter()
            .find(|(fragment, _)| self.url.contains(fragment))
            .map(|(_, name)| *name)
            .unwrap_or("other")
    }

    /// Identifier of the referenced record within its archive.
    ///
    /// The last path segment for most archives, the `study_id` query
    /// parameter for dbGaP and `eva-study` for EVA.
    pub fn data_id(&self) -> Option<String> {
        let url = Url::parse(&self.url).ok()?;
        match self.nickname() {
            "other" => None,
            "dbGaP" => query_param(&url, "study_id"),
            "EVA" => query_param(&url, "eva-study"),
            _ => url
                .path_segments()?
                .filter(|segment| !segment.is_empty())
                .last()
                .map(str::to_string),
        }
    }
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Ontology URL for a DUO code such as `DUO:0000007`.
pub fn duo_url(code: &str) -> String {
    format!("{}{}", DUO_BASE_URL, code.replace(':', "_"))
}

impl Canonical for ExternalReference {
    fn write_canonical(&self, hasher: &mut CanonicalHasher) {
        hasher
            .field(&self.url)
            .fields(self.duo.iter().map(String::as_str));
    }
}

impl TryFrom<ExternalReferenceRepr> for ExternalReference {
    type Error = BioSamplesError;

    fn try_from(repr: ExternalReferenceRepr) -> Result<Self> {
        Self::with_duo(&repr.url, repr.duo)
    }
}

impl From<ExternalReference> for ExternalReferenceRepr {
    fn from(reference: ExternalReference) -> Self {
        Self {
            url: reference.url,
            duo: reference.duo,
        }
    }
}
