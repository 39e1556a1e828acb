//! The sample record and its value objects.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accession::{Accession, Namespace};

use super::attribute::Attribute;
use super::external_reference::ExternalReference;
use super::relationship::Relationship;
use super::structured::StructuredDataTable;

/// Owning identity of a record: a domain or a Webin submission account,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Owner {
    Domain(String),
    #[serde(rename = "webinSubmissionAccountId")]
    WebinAccount(String),
}

/// Provenance of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionChannel {
    /// Import pipeline mirroring ENA.
    PipelineEna,
    /// Import pipeline mirroring NCBI.
    PipelineNcbi,
    /// Spreadsheet/file uploader.
    FileUpload,
    /// Interactive JSON API.
    #[default]
    InteractiveApi,
}

impl SubmissionChannel {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionChannel::PipelineEna => "ENA pipeline",
            SubmissionChannel::PipelineNcbi => "NCBI pipeline",
            SubmissionChannel::FileUpload => "file upload",
            SubmissionChannel::InteractiveApi => "interactive API",
        }
    }

    /// Whether this is one of the archive import pipelines.
    pub fn is_pipeline(&self) -> bool {
        matches!(
            self,
            SubmissionChannel::PipelineEna | SubmissionChannel::PipelineNcbi
        )
    }
}

/// Whether a record is an individual sample or a group of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    #[default]
    Sample,
    Group,
}

impl RecordKind {
    /// Accession namespace records of this kind are allocated from.
    pub fn namespace(&self) -> Namespace {
        match self {
            RecordKind::Sample => Namespace::Sample,
            RecordKind::Group => Namespace::Group,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubmed_id: Option<String>,
}

/// A sample (or group) metadata record.
///
/// Collections are sorted sets, so two records holding the same elements
/// compare equal whatever order they were built in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession: Option<Accession>,

    pub name: String,

    #[serde(default)]
    pub kind: RecordKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<DateTime<Utc>>,

    #[serde(default, rename = "characteristics")]
    pub attributes: BTreeSet<Attribute>,

    #[serde(default)]
    pub relationships: BTreeSet<Relationship>,

    #[serde(default)]
    pub external_references: BTreeSet<ExternalReference>,

    #[serde(default)]
    pub organizations: BTreeSet<Organization>,

    #[serde(default)]
    pub contacts: BTreeSet<Contact>,

    #[serde(default)]
    pub publications: BTreeSet<Publication>,

    #[serde(default)]
    pub structured_data: BTreeSet<StructuredDataTable>,

    #[serde(default, rename = "submittedVia")]
    pub channel: SubmissionChannel,
}

impl Sample {
    /// Create an empty, unaccessioned record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            accession: None,
            name: name.into(),
            kind: RecordKind::default(),
            tax_id: None,
            owner: None,
            create: None,
            submitted: None,
            release: None,
            update: None,
            attributes: BTreeSet::new(),
            relationships: BTreeSet::new(),
            external_references: BTreeSet::new(),
            organizations: BTreeSet::new(),
            contacts: BTreeSet::new(),
            publications: BTreeSet::new(),
            structured_data: BTreeSet::new(),
            channel: SubmissionChannel::default(),
        }
    }

    /// Set the accession.
    pub fn with_accession(mut self, accession: Accession) -> Self {
        self.accession = Some(accession);
        self
    }

    /// Set the record kind.
    pub fn with_kind(mut self, kind: RecordKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the taxonomy id.
    pub fn with_tax_id(mut self, tax_id: u64) -> Self {
        self.tax_id = Some(tax_id);
        self
    }

    /// Set the owning identity.
    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_create(mut self, at: DateTime<Utc>) -> Self {
        self.create = Some(at);
        self
    }

    pub fn with_submitted(mut self, at: DateTime<Utc>) -> Self {
        self.submitted = Some(at);
        self
    }

    pub fn with_release(mut self, at: DateTime<Utc>) -> Self {
        self.release = Some(at);
        self
    }

    pub fn with_update(mut self, at: DateTime<Utc>) -> Self {
        self.update = Some(at);
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.insert(attribute);
        self
    }

    /// Add a relationship.
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.insert(relationship);
        self
    }

    /// Add an external reference.
    pub fn with_external_reference(mut self, reference: ExternalReference) -> Self {
        self.external_references.insert(reference);
        self
    }

    pub fn with_organization(mut self, organization: Organization) -> Self {
        self.organizations.insert(organization);
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contacts.insert(contact);
        self
    }

    pub fn with_publication(mut self, publication: Publication) -> Self {
        self.publications.insert(publication);
        self
    }

    /// Add a structured data table.
    pub fn with_structured_data(mut self, table: StructuredDataTable) -> Self {
        self.structured_data.insert(table);
        self
    }

    /// Set the submission channel.
    pub fn with_channel(mut self, channel: SubmissionChannel) -> Self {
        self.channel = channel;
        self
    }

    /// Whether an accession has been assigned.
    pub fn has_accession(&self) -> bool {
        self.accession.is_some()
    }

    /// All attributes of type "SRA accession".
    pub fn sra_accession_attributes(&self) -> Vec<&Attribute> {
        self.attributes
            .iter()
            .filter(|attr| attr.is_sra_accession())
            .collect()
    }

    /// The SRA accession, if exactly one is present.
    pub fn sra_accession(&self) -> Option<&str> {
        match self.sra_accession_attributes().as_slice() {
            [single] => Some(single.value.as_str()),
            _ => None,
        }
    }

    /// Whether the record holds no submitter metadata.
    ///
    /// Empty means no taxonomy id and no attributes, relationships,
    /// publications, contacts, organizations, structured data or external
    /// references. A record in this state has never really been submitted.
    pub fn is_metadata_empty(&self) -> bool {
        self.tax_id.is_none_or(|id| id == 0)
            && self.attributes.is_empty()
            && self.relationships.is_empty()
            && self.publications.is_empty()
            && self.contacts.is_empty()
            && self.organizations.is_empty()
            && self.structured_data.is_empty()
            && self.external_references.is_empty()
    }

    /// Relationships whose source is `accession`.
    pub fn relationships_owned_by<'a>(
        &'a self,
        accession: &'a str,
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships
            .iter()
            .filter(move |rel| rel.is_owned_by(accession))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record() {
        let sample = Sample::new("placeholder");
        assert!(sample.is_metadata_empty());
        assert!(!sample.has_accession());

        assert!(!sample.clone().with_tax_id(9606).is_metadata_empty());
        assert!(sample.clone().with_tax_id(0).is_metadata_empty());
        assert!(
            !sample
                .clone()
                .with_attribute(Attribute::new("organism", "Homo sapiens"))
                .is_metadata_empty()
        );
        assert!(
            !sample
                .with_structured_data(StructuredDataTable::new("AMR"))
                .is_metadata_empty()
        );
    }

    #[test]
    fn test_sra_accession_requires_single_attribute() {
        let one = Sample::new("s").with_attribute(Attribute::sra_accession("ERS1"));
        assert_eq!(one.sra_accession(), Some("ERS1"));

        let two = one.clone().with_attribute(Attribute::sra_accession("ERS2"));
        assert_eq!(two.sra_accession_attributes().len(), 2);
        assert_eq!(two.sra_accession(), None);
    }

    #[test]
    fn test_set_equality_is_order_insensitive() {
        let a = Sample::new("s")
            .with_attribute(Attribute::new("a", "1"))
            .with_attribute(Attribute::new("b", "2"));
        let b = Sample::new("s")
            .with_attribute(Attribute::new("b", "2"))
            .with_attribute(Attribute::new("a", "1"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_owner_serde() {
        let json = serde_json::to_value(Owner::WebinAccount("Webin-1".into())).unwrap();
        assert_eq!(json["webinSubmissionAccountId"], "Webin-1");

        let owner: Owner = serde_json::from_str(r#"{"domain":"self.example"}"#).unwrap();
        assert_eq!(owner, Owner::Domain("self.example".into()));
    }

    #[test]
    fn test_channel_defaults_to_interactive_api() {
        let sample: Sample = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(sample.channel, SubmissionChannel::InteractiveApi);
        assert_eq!(sample.kind, RecordKind::Sample);
    }
}
