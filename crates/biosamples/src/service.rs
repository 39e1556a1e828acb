//! The sample write service: repository, engine and notifier wired together.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::accession::Accession;
use crate::clock::{Clock, SystemClock};
use crate::config::RegistryConfig;
use crate::curation::{apply_all, Curation, CurationLink};
use crate::error::{BioSamplesError, Result};
use crate::model::{Owner, Sample};
use crate::notify::{LoggingNotifier, Notifier};
use crate::reconcile::{Reconciliation, ReconciliationEngine, WriteContext};
use crate::store::{CurationRepository, MemoryStore, SampleRepository, SequenceStore};
use crate::validation::SampleValidator;

/// Entry point for writes and curation attachment.
///
/// # Example
///
/// ```
/// use biosamples::{RegistryConfig, Sample, SampleService, WriteContext};
/// use biosamples::model::{Owner, SubmissionChannel};
/// use chrono::Utc;
///
/// let service = SampleService::in_memory(&RegistryConfig::default());
/// let context = WriteContext::new(
///     Owner::WebinAccount("Webin-12345".into()),
///     SubmissionChannel::InteractiveApi,
/// );
///
/// let written = service
///     .submit(&Sample::new("blood draw").with_release(Utc::now()), &context)
///     .unwrap();
/// let accession = written.sample.accession.unwrap();
/// assert_eq!(accession.prefix(), "SAMEA");
/// ```
pub struct SampleService {
    engine: ReconciliationEngine,
    samples: Arc<dyn SampleRepository>,
    curations: Arc<dyn CurationRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl SampleService {
    /// Create a service over separate repositories.
    pub fn new(
        config: &RegistryConfig,
        samples: Arc<dyn SampleRepository>,
        sequences: Arc<dyn SequenceStore>,
        curations: Arc<dyn CurationRepository>,
    ) -> Self {
        Self {
            engine: ReconciliationEngine::new(config, sequences),
            samples,
            curations,
            notifier: Arc::new(LoggingNotifier),
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a service over one store implementing every repository.
    pub fn with_store<S>(config: &RegistryConfig, store: Arc<S>) -> Self
    where
        S: SampleRepository + SequenceStore + CurationRepository + 'static,
    {
        Self::new(config, store.clone(), store.clone(), store)
    }

    /// Create a service backed by a fresh [`MemoryStore`].
    pub fn in_memory(config: &RegistryConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// Set the notifier invoked after each successful write.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Set the clock used for timestamps and link creation times.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.engine = self.engine.with_clock(clock.clone());
        self.clock = clock;
        self
    }

    /// Replace the validator.
    pub fn with_validator(mut self, validator: Arc<dyn SampleValidator>) -> Self {
        self.engine = self.engine.with_validator(validator);
        self
    }

    /// Reconcile and persist a submission.
    ///
    /// Nothing is written unless reconciliation succeeds. Notification
    /// happens after the write; its failure is logged and otherwise ignored.
    pub fn submit(&self, sample: &Sample, context: &WriteContext) -> Result<Reconciliation> {
        let existing = match &sample.accession {
            Some(accession) => self.samples.get(accession)?,
            None => None,
        };

        let reconciliation = self.engine.reconcile(sample, existing.as_ref(), context)?;
        self.samples.put(&reconciliation.sample)?;

        if let Some(accession) = &reconciliation.sample.accession {
            info!(accession = %accession, channel = context.channel.label(), "Stored record");
            if let Err(e) = self.notifier.notify(accession) {
                warn!(accession = %accession, error = %e, "Notification failed");
            }
        }

        Ok(reconciliation)
    }

    /// The stored record, as submitted.
    pub fn fetch(&self, accession: &Accession) -> Result<Option<Sample>> {
        self.samples.get(accession)
    }

    /// The stored record with every applicable linked curation applied.
    pub fn fetch_curated(&self, accession: &Accession) -> Result<Option<Sample>> {
        let Some(sample) = self.samples.get(accession)? else {
            return Ok(None);
        };

        let mut curations = Vec::new();
        for link in self.curations.links_for(accession)? {
            match self.curations.get_curation(link.curation())? {
                Some(curation) => curations.push(curation),
                None => warn!(link = %link.hash(), "Link points at a missing curation"),
            }
        }

        let (curated, unapplied) = apply_all(&sample, &curations);
        if !unapplied.is_empty() {
            debug!(accession = %accession, unapplied = unapplied.len(), "Some curations did not apply");
        }
        Ok(Some(curated))
    }

    /// Attach a curation to a stored record on behalf of `owner`.
    ///
    /// The curation is stored once under its hash however many samples it is
    /// attached to, and attaching it twice to the same sample returns the
    /// original link.
    pub fn attach_curation(
        &self,
        accession: &Accession,
        curation: &Curation,
        owner: Owner,
    ) -> Result<CurationLink> {
        if self.samples.get(accession)?.is_none() {
            return Err(BioSamplesError::AccessionConflict {
                accession: accession.to_string(),
                message: "no record to curate".into(),
            });
        }

        if self.curations.put_curation(curation)? {
            debug!(curation = %curation.hash(), "Stored new curation");
        }

        let link = CurationLink::new(accession.clone(), curation, owner, self.clock.now());
        if self.curations.put_link(&link)? {
            info!(accession = %accession, link = %link.hash(), "Attached curation");
            return Ok(link);
        }

        let existing = self
            .curations
            .links_for(accession)?
            .into_iter()
            .find(|stored| stored.hash() == link.hash());
        Ok(existing.unwrap_or(link))
    }

    /// Links attached to a record, oldest first.
    pub fn curation_links(&self, accession: &Accession) -> Result<Vec<CurationLink>> {
        self.curations.links_for(accession)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, SubmissionChannel};
    use crate::notify::QueueNotifier;
    use chrono::Utc;

    struct BrokenNotifier;

    impl Notifier for BrokenNotifier {
        fn notify(&self, accession: &Accession) -> Result<()> {
            Err(BioSamplesError::Notification {
                accession: accession.to_string(),
                message: "broker down".into(),
            })
        }
    }

    struct ExhaustedSequences;

    impl SequenceStore for ExhaustedSequences {
        fn next_value(&self, sequence: &str) -> Result<u64> {
            Err(BioSamplesError::StoreUnavailable(format!("sequence '{}' unavailable", sequence)))
        }
    }

    fn context() -> WriteContext {
        WriteContext::new(Owner::WebinAccount("Webin-1".into()), SubmissionChannel::InteractiveApi)
    }

    fn draft() -> Sample {
        Sample::new("draft").with_release(Utc::now())
    }

    #[test]
    fn test_submit_persists_and_notifies() {
        let (notifier, receiver) = QueueNotifier::channel();
        let service =
            SampleService::in_memory(&RegistryConfig::default()).with_notifier(Arc::new(notifier));

        let written = service.submit(&draft(), &context()).unwrap();
        let accession = written.sample.accession.clone().unwrap();

        assert_eq!(service.fetch(&accession).unwrap(), Some(written.sample));
        assert_eq!(receiver.try_recv().unwrap(), accession);
    }

    #[test]
    fn test_notification_failure_is_swallowed() {
        let service = SampleService::in_memory(&RegistryConfig::default())
            .with_notifier(Arc::new(BrokenNotifier));
        assert!(service.submit(&draft(), &context()).is_ok());
    }

    #[test]
    fn test_rejected_write_persists_nothing() {
        let store = Arc::new(MemoryStore::new());
        let service = SampleService::with_store(&RegistryConfig::default(), store.clone());

        let unknown = draft().with_accession(Accession::parse("SAMEA999").unwrap());
        let err = service.submit(&unknown, &context()).unwrap_err();

        assert!(matches!(err, BioSamplesError::AccessionConflict { .. }));
        assert_eq!(store.sample_count(), 0);
    }

    #[test]
    fn test_allocation_failure_persists_nothing() {
        let store = Arc::new(MemoryStore::new());
        let (notifier, receiver) = QueueNotifier::channel();
        let service = SampleService::new(
            &RegistryConfig::default(),
            store.clone(),
            Arc::new(ExhaustedSequences),
            store.clone(),
        )
        .with_notifier(Arc::new(notifier));

        let err = service.submit(&draft(), &context()).unwrap_err();

        assert!(matches!(err, BioSamplesError::Allocation { .. }));
        assert!(!err.rejects_write());
        assert_eq!(store.sample_count(), 0);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_attach_curation_is_idempotent() {
        let service = SampleService::in_memory(&RegistryConfig::default());
        let written = service
            .submit(&draft().with_attribute(Attribute::new("organism", "human")), &context())
            .unwrap();
        let accession = written.sample.accession.unwrap();

        let curation = Curation::attributes(
            [Attribute::new("organism", "human")],
            [Attribute::new("organism", "Homo sapiens")],
        );
        let curator = Owner::Domain("self.curators".into());

        let first = service
            .attach_curation(&accession, &curation, curator.clone())
            .unwrap();
        let second = service.attach_curation(&accession, &curation, curator).unwrap();

        assert_eq!(first, second);
        assert_eq!(service.curation_links(&accession).unwrap().len(), 1);

        let curated = service.fetch_curated(&accession).unwrap().unwrap();
        assert!(curated.attributes.contains(&Attribute::new("organism", "Homo sapiens")));
        assert!(!curated.attributes.contains(&Attribute::new("organism", "human")));
    }

    #[test]
    fn test_attach_to_missing_record() {
        let service = SampleService::in_memory(&RegistryConfig::default());
        let curation = Curation::attributes([], [Attribute::new("a", "b")]);
        let err = service
            .attach_curation(
                &Accession::parse("SAMEA1").unwrap(),
                &curation,
                Owner::Domain("d".into()),
            )
            .unwrap_err();
        assert!(matches!(err, BioSamplesError::AccessionConflict { .. }));
    }
}
