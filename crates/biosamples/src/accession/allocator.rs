//! Per-namespace accession allocation on top of an atomic sequence store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::AccessionConfig;
use crate::error::{BioSamplesError, Result};
use crate::store::SequenceStore;

use super::grammar::Accession;

/// Accession namespaces, each backed by its own counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Sample,
    Group,
    Sra,
}

impl Namespace {
    /// Every namespace.
    pub const ALL: [Namespace; 3] = [Namespace::Sample, Namespace::Group, Namespace::Sra];

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Namespace::Sample => "sample",
            Namespace::Group => "group",
            Namespace::Sra => "SRA",
        }
    }
}

/// Hands out accessions from the sequence store.
///
/// Uniqueness and monotonicity come from the store's atomic increment; the
/// allocator holds no counters of its own. Store failures are surfaced as
/// [`BioSamplesError::Allocation`] and never retried here.
#[derive(Clone)]
pub struct AccessionAllocator {
    sequences: Arc<dyn SequenceStore>,
    config: AccessionConfig,
}

impl AccessionAllocator {
    /// Create an allocator over a sequence store.
    pub fn new(sequences: Arc<dyn SequenceStore>, config: AccessionConfig) -> Self {
        Self { sequences, config }
    }

    /// Namespace settings in use.
    pub fn config(&self) -> &AccessionConfig {
        &self.config
    }

    /// Allocate the next accession in `namespace`.
    pub fn allocate(&self, namespace: Namespace) -> Result<Accession> {
        let settings = self.config.namespace(namespace);
        debug!(namespace = namespace.label(), sequence = %settings.sequence, "Allocating accession");

        let value = self
            .sequences
            .next_value(&settings.sequence)
            .map_err(|e| {
                error!(namespace = namespace.label(), error = %e, "Sequence store failed");
                match e {
                    BioSamplesError::Allocation { .. } => e,
                    other => BioSamplesError::Allocation {
                        namespace: namespace.label().to_string(),
                        message: other.to_string(),
                    },
                }
            })?;

        let accession = Accession::from_parts(&settings.prefix, value).map_err(|e| {
            BioSamplesError::Allocation {
                namespace: namespace.label().to_string(),
                message: e.to_string(),
            }
        })?;

        info!(namespace = namespace.label(), accession = %accession, "Allocated accession");
        Ok(accession)
    }
}
