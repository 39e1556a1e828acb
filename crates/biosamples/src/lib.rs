//! BioSamples: write-path reconciliation for biological sample records.
//!
//! Incoming submissions are validated, merged with the stored record under
//! provenance rules and persisted wholesale. Accessions are drawn from atomic
//! per-namespace counters; curations and their links are content-addressed
//! so that repeated submissions deduplicate themselves.
//!
//! # Core Principles
//!
//! - **Immutable accessions**: once assigned, never reassigned or reused
//! - **No partial writes**: every check runs before allocation or persistence
//! - **Content identity**: curations are keyed by the hash of their content
//!
//! # Example
//!
//! ```
//! use biosamples::model::{Attribute, Owner, SubmissionChannel};
//! use biosamples::{RegistryConfig, Sample, SampleService, WriteContext};
//! use chrono::Utc;
//!
//! let service = SampleService::in_memory(&RegistryConfig::default());
//! let context = WriteContext::new(
//!     Owner::Domain("self.example".into()),
//!     SubmissionChannel::InteractiveApi,
//! );
//!
//! let sample = Sample::new("liver biopsy")
//!     .with_release(Utc::now())
//!     .with_attribute(Attribute::new("organism", "Homo sapiens"));
//!
//! let written = service.submit(&sample, &context).unwrap();
//! println!("Accession: {}", written.sample.accession.as_ref().unwrap());
//! println!("SRA accession: {:?}", written.sample.sra_accession());
//! ```

pub mod accession;
pub mod canonical;
pub mod clock;
pub mod config;
pub mod curation;
pub mod error;
pub mod model;
pub mod notify;
pub mod reconcile;
pub mod store;
pub mod validation;

mod service;

pub use crate::service::SampleService;
pub use accession::{Accession, AccessionAllocator, Namespace};
pub use canonical::ContentHash;
pub use config::RegistryConfig;
pub use curation::{Curation, CurationLink};
pub use error::{BioSamplesError, Result};
pub use model::Sample;
pub use reconcile::{
    Reconciliation, ReconciliationEngine, TrustLevel, WriteAttempt, WriteContext, WriteState,
};
pub use validation::{SampleValidator, ValidationIssue};
