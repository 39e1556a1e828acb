//! Record model: samples, attributes, relationships and external references.

mod attribute;
mod external_reference;
mod relationship;
mod sample;
mod structured;

pub use attribute::{Attribute, SRA_ACCESSION};
pub use external_reference::{duo_url, ExternalReference, DUO_BASE_URL};
pub use relationship::Relationship;
pub use sample::{
    Contact, Organization, Owner, Publication, RecordKind, Sample, SubmissionChannel,
};
pub use structured::{StructuredCell, StructuredDataTable};
