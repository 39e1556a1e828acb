//! The write-path decision procedure.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::accession::{Accession, AccessionAllocator, Namespace};
use crate::clock::{Clock, SystemClock};
use crate::config::RegistryConfig;
use crate::error::{BioSamplesError, Result};
use crate::model::{Attribute, Relationship, Sample};
use crate::store::SequenceStore;
use crate::validation::{SampleValidator, ValidationEngine};

use super::context::WriteContext;
use super::dates::Timestamps;

/// Lifecycle of a record through a single write.
///
/// A write starts from the record's current state: `Unaccessioned` for a new
/// submission, `Accessioned` for a resubmission. Success ends in
/// `Accessioned`, a refused write in `Rejected`. An infrastructure failure
/// leaves the write where it stopped, which is `Allocating` when the sequence
/// store gave out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteState {
    Unaccessioned,
    Allocating,
    /// Terminal, success.
    Accessioned,
    /// Terminal, error.
    Rejected,
}

impl WriteState {
    fn initial(incoming: &Sample) -> Self {
        if incoming.has_accession() {
            WriteState::Accessioned
        } else {
            WriteState::Unaccessioned
        }
    }

    fn advance(&mut self, next: WriteState) {
        if *self != next {
            debug!(from = ?self, to = ?next, "Write state changed");
            *self = next;
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WriteState::Accessioned | WriteState::Rejected)
    }
}

/// A reconciliation together with the state the write ended in.
#[derive(Debug)]
pub struct WriteAttempt {
    pub state: WriteState,
    pub result: Result<Reconciliation>,
}

impl WriteAttempt {
    pub fn is_rejected(&self) -> bool {
        self.state == WriteState::Rejected
    }

    pub fn into_result(self) -> Result<Reconciliation> {
        self.result
    }
}

/// What the engine did besides producing the merged record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    /// Accession allocated for a previously unaccessioned record.
    pub allocated_accession: Option<Accession>,

    /// SRA accession allocated because neither side carried one.
    pub allocated_sra: Option<Accession>,

    /// The stored record held no metadata, so this write counts as its first
    /// real submission.
    pub first_time_metadata: bool,

    /// Structured data was copied over from the stored record.
    pub structured_data_retained: bool,

    /// Targets of relationships the stored record owned before this write.
    pub existing_relationship_targets: Vec<String>,

    pub state: WriteState,
}

/// Result of a successful reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// The record to persist as the new authoritative version.
    pub sample: Sample,
    pub outcome: ReconcileOutcome,
}

enum SraDecision {
    /// Incoming carries the value to keep.
    Keep,
    /// Copy the stored attribute over.
    Reuse(Attribute),
    /// Neither side has one.
    Allocate,
}

/// Merges an incoming submission with the stored record.
///
/// The engine holds no per-record state and never mutates its inputs. All
/// rejections happen before any accession is allocated, so a rejected write
/// never consumes a number.
pub struct ReconciliationEngine {
    validator: Arc<dyn SampleValidator>,
    allocator: AccessionAllocator,
    clock: Arc<dyn Clock>,
    retain_structured_data: bool,
}

impl ReconciliationEngine {
    /// Create an engine with the default validators and the system clock.
    pub fn new(config: &RegistryConfig, sequences: Arc<dyn SequenceStore>) -> Self {
        Self {
            validator: Arc::new(ValidationEngine::new()),
            allocator: AccessionAllocator::new(sequences, config.accessions.clone()),
            clock: Arc::new(SystemClock),
            retain_structured_data: config.retain_structured_data,
        }
    }

    /// Replace the validator.
    pub fn with_validator(mut self, validator: Arc<dyn SampleValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn allocator(&self) -> &AccessionAllocator {
        &self.allocator
    }

    /// Reconcile `incoming` against `existing` under `context`.
    ///
    /// `existing` is the record stored under the incoming accession, `None`
    /// if there is none. On success the returned record is complete: it has
    /// an accession, all four timestamps and exactly one SRA accession.
    pub fn reconcile(
        &self,
        incoming: &Sample,
        existing: Option<&Sample>,
        context: &WriteContext,
    ) -> Result<Reconciliation> {
        self.attempt(incoming, existing, context).into_result()
    }

    /// Like [`reconcile`](Self::reconcile), also reporting the state the
    /// write ended in.
    pub fn attempt(
        &self,
        incoming: &Sample,
        existing: Option<&Sample>,
        context: &WriteContext,
    ) -> WriteAttempt {
        let mut state = WriteState::initial(incoming);
        let result = self.merge(incoming, existing, context, &mut state);

        if let Err(e) = &result {
            if e.rejects_write() {
                state.advance(WriteState::Rejected);
            } else {
                warn!(state = ?state, error = %e, "Write aborted");
            }
        }
        WriteAttempt { state, result }
    }

    fn merge(
        &self,
        incoming: &Sample,
        existing: Option<&Sample>,
        context: &WriteContext,
        state: &mut WriteState,
    ) -> Result<Reconciliation> {
        let issues = self.validator.validate(incoming);
        if !issues.is_empty() {
            error!(name = %incoming.name, issues = issues.len(), "Rejected invalid record");
            return Err(BioSamplesError::Validation(issues));
        }

        let existing = check_accession(incoming, existing, context)?;
        let accession = incoming.accession.as_ref();

        let first_time_metadata = existing.is_none_or(Sample::is_metadata_empty);
        if existing.is_some_and(|old| old == incoming) {
            info!(accession = ?accession.map(Accession::as_str), "Resubmission identical to stored record");
        }

        let timestamps = Timestamps::resolve(
            incoming,
            existing,
            context.channel,
            first_time_metadata,
            self.clock.now(),
        );

        let (relationships, existing_relationship_targets) =
            retained_relationships(incoming, existing, context);

        let sra = decide_sra(incoming, existing, context)?;

        let (structured_data, structured_data_retained) = match existing {
            Some(old)
                if self.retain_structured_data
                    && incoming.structured_data.is_empty()
                    && !old.structured_data.is_empty() =>
            {
                info!(
                    accession = ?accession.map(Accession::as_str),
                    tables = old.structured_data.len(),
                    "Retaining stored structured data"
                );
                (old.structured_data.clone(), true)
            }
            _ => (incoming.structured_data.clone(), false),
        };

        if accession.is_none() {
            state.advance(WriteState::Allocating);
        }

        let mut attributes = incoming.attributes.clone();
        let allocated_sra = match sra {
            SraDecision::Keep => None,
            SraDecision::Reuse(attribute) => {
                attributes.insert(attribute);
                None
            }
            SraDecision::Allocate => {
                let sra = self.allocator.allocate(Namespace::Sra)?;
                attributes.insert(Attribute::sra_accession(sra.as_str()));
                Some(sra)
            }
        };

        let (accession, allocated_accession, relationships) = match accession {
            Some(accession) => (accession.clone(), None, relationships),
            None => {
                let fresh = self.allocator.allocate(incoming.kind.namespace())?;
                let relationships = source_relationships(relationships, &fresh);
                (fresh.clone(), Some(fresh), relationships)
            }
        };

        let sample = Sample {
            accession: Some(accession),
            owner: incoming
                .owner
                .clone()
                .or_else(|| Some(context.identity.clone())),
            create: Some(timestamps.create),
            submitted: Some(timestamps.submitted),
            release: timestamps.release,
            update: Some(timestamps.update),
            attributes,
            relationships,
            structured_data,
            channel: context.channel,
            ..incoming.clone()
        };

        state.advance(WriteState::Accessioned);
        Ok(Reconciliation {
            sample,
            outcome: ReconcileOutcome {
                allocated_accession,
                allocated_sra,
                first_time_metadata,
                structured_data_retained,
                existing_relationship_targets,
                state: *state,
            },
        })
    }
}

/// Decide which stored record, if any, the write is reconciled against.
fn check_accession<'a>(
    incoming: &Sample,
    existing: Option<&'a Sample>,
    context: &WriteContext,
) -> Result<Option<&'a Sample>> {
    let Some(accession) = incoming.accession.as_ref() else {
        if existing.is_some() {
            debug!(name = %incoming.name, "Ignoring stored record for unaccessioned submission");
        }
        return Ok(None);
    };

    match existing {
        Some(old) if old.accession.as_ref() != Some(accession) => {
            Err(BioSamplesError::InvariantViolation(format!(
                "stored record {:?} does not match incoming accession {}",
                old.accession.as_ref().map(Accession::as_str),
                accession
            )))
        }
        Some(old) => Ok(Some(old)),
        None if context.is_privileged() => {
            debug!(accession = %accession, "Privileged caller introducing record");
            Ok(None)
        }
        None => {
            warn!(accession = %accession, identity = ?context.identity, "No stored record for accession");
            Err(BioSamplesError::AccessionConflict {
                accession: accession.to_string(),
                message: "no record exists under this accession".into(),
            })
        }
    }
}

/// Relationships to persist plus the targets the stored record owned.
fn retained_relationships(
    incoming: &Sample,
    existing: Option<&Sample>,
    context: &WriteContext,
) -> (BTreeSet<Relationship>, Vec<String>) {
    let mut relationships = incoming.relationships.clone();

    let (Some(accession), Some(old)) = (incoming.accession.as_ref(), existing) else {
        return (relationships, Vec::new());
    };

    let owned: Vec<&Relationship> = old.relationships_owned_by(accession.as_str()).collect();
    let targets = owned.iter().map(|rel| rel.target.clone()).collect();

    if context.retains_owned_relationships() {
        relationships.extend(owned.into_iter().cloned());
    }
    (relationships, targets)
}

fn decide_sra(
    incoming: &Sample,
    existing: Option<&Sample>,
    context: &WriteContext,
) -> Result<SraDecision> {
    let incoming_sra = incoming.sra_accession_attributes();
    let existing_sra = existing
        .map(Sample::sra_accession_attributes)
        .unwrap_or_default();

    if incoming_sra.len() > 1 || existing_sra.len() > 1 {
        return Err(BioSamplesError::InvariantViolation(format!(
            "multiple SRA accessions (incoming {}, stored {})",
            incoming_sra.len(),
            existing_sra.len()
        )));
    }

    match (incoming_sra.first(), existing_sra.first()) {
        (None, Some(old)) => Ok(SraDecision::Reuse((*old).clone())),
        (None, None) => Ok(SraDecision::Allocate),
        (Some(new), Some(old)) if new.value != old.value => {
            if context.is_privileged() {
                info!(from = %old.value, to = %new.value, "Privileged SRA accession change");
                Ok(SraDecision::Keep)
            } else {
                warn!(stored = %old.value, incoming = %new.value, "Refusing SRA accession change");
                Err(BioSamplesError::InvariantViolation(format!(
                    "SRA accession {} cannot be changed to {}",
                    old.value, new.value
                )))
            }
        }
        (Some(_), _) => Ok(SraDecision::Keep),
    }
}

/// Give every source-less relationship the newly allocated accession.
fn source_relationships(
    relationships: BTreeSet<Relationship>,
    accession: &Accession,
) -> BTreeSet<Relationship> {
    relationships
        .into_iter()
        .map(|rel| {
            if rel.has_blank_source() {
                rel.with_source(accession.as_str())
            } else {
                rel
            }
        })
        .collect()
}
