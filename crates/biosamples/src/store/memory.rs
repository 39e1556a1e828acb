//! In-process store backed by lock-guarded maps.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, RwLock};

use tracing::debug;

use crate::accession::Accession;
use crate::canonical::ContentHash;
use crate::curation::{Curation, CurationLink};
use crate::error::{BioSamplesError, Result};
use crate::model::Sample;

use super::{CurationRepository, SampleRepository, SequenceStore};

/// Store holding everything in memory.
///
/// Sequences start at zero, so the first value handed out is 1.
#[derive(Debug, Default)]
pub struct MemoryStore {
    samples: RwLock<HashMap<Accession, Sample>>,
    curations: RwLock<HashMap<ContentHash, Curation>>,
    links: RwLock<BTreeMap<ContentHash, CurationLink>>,
    sequences: Mutex<HashMap<String, u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `sequence` after `last_issued`.
    pub fn with_sequence(self, sequence: impl Into<String>, last_issued: u64) -> Self {
        if let Ok(mut sequences) = self.sequences.lock() {
            sequences.insert(sequence.into(), last_issued);
        }
        self
    }

    /// Number of stored records.
    pub fn sample_count(&self) -> usize {
        self.samples.read().map(|s| s.len()).unwrap_or(0)
    }
}

fn poisoned(what: &str) -> BioSamplesError {
    BioSamplesError::StoreUnavailable(format!("{} lock poisoned", what))
}

impl SampleRepository for MemoryStore {
    fn get(&self, accession: &Accession) -> Result<Option<Sample>> {
        let samples = self.samples.read().map_err(|_| poisoned("sample"))?;
        Ok(samples.get(accession).cloned())
    }

    fn put(&self, sample: &Sample) -> Result<()> {
        let accession = sample.accession.clone().ok_or_else(|| {
            BioSamplesError::Persistence(format!("record '{}' has no accession", sample.name))
        })?;
        debug!(accession = %accession, "Storing record in memory");
        let mut samples = self.samples.write().map_err(|_| poisoned("sample"))?;
        samples.insert(accession, sample.clone());
        Ok(())
    }
}

impl SequenceStore for MemoryStore {
    fn next_value(&self, sequence: &str) -> Result<u64> {
        let mut sequences = self.sequences.lock().map_err(|_| poisoned("sequence"))?;
        let counter = sequences.entry(sequence.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }
}

impl CurationRepository for MemoryStore {
    fn get_curation(&self, hash: &ContentHash) -> Result<Option<Curation>> {
        let curations = self.curations.read().map_err(|_| poisoned("curation"))?;
        Ok(curations.get(hash).cloned())
    }

    fn put_curation(&self, curation: &Curation) -> Result<bool> {
        let mut curations = self.curations.write().map_err(|_| poisoned("curation"))?;
        if curations.contains_key(curation.hash()) {
            return Ok(false);
        }
        curations.insert(curation.hash().clone(), curation.clone());
        Ok(true)
    }

    fn put_link(&self, link: &CurationLink) -> Result<bool> {
        let mut links = self.links.write().map_err(|_| poisoned("link"))?;
        if links.contains_key(link.hash()) {
            return Ok(false);
        }
        links.insert(link.hash().clone(), link.clone());
        Ok(true)
    }

    fn links_for(&self, sample: &Accession) -> Result<Vec<CurationLink>> {
        let links = self.links.read().map_err(|_| poisoned("link"))?;
        let mut found: Vec<CurationLink> = links
            .values()
            .filter(|link| link.sample() == sample)
            .cloned()
            .collect();
        found.sort_by_key(|link| link.created());
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribute, Owner};
    use chrono::Utc;
    use std::collections::HashSet;

    #[test]
    fn test_sequences_are_independent() {
        let store = MemoryStore::new().with_sequence("sample", 41);
        assert_eq!(store.next_value("sample").unwrap(), 42);
        assert_eq!(store.next_value("sample").unwrap(), 43);
        assert_eq!(store.next_value("group").unwrap(), 1);
    }

    #[test]
    fn test_concurrent_next_value_is_unique() {
        let store = MemoryStore::new();
        let values: Vec<u64> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..100)
                            .map(|_| store.next_value("sample").unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let unique: HashSet<u64> = values.iter().copied().collect();
        assert_eq!(unique.len(), 800);
    }

    #[test]
    fn test_put_requires_accession() {
        let store = MemoryStore::new();
        assert!(store.put(&Sample::new("unaccessioned")).is_err());

        let accession = Accession::parse("SAMEA7").unwrap();
        store
            .put(&Sample::new("s").with_accession(accession.clone()))
            .unwrap();
        assert_eq!(store.get(&accession).unwrap().unwrap().name, "s");
        assert_eq!(store.sample_count(), 1);
    }

    #[test]
    fn test_curation_dedup() {
        let store = MemoryStore::new();
        let curation = Curation::attributes([Attribute::new("a", "1")], []);
        assert!(store.put_curation(&curation).unwrap());
        assert!(!store.put_curation(&curation.clone()).unwrap());

        let sample = Accession::parse("SAMEA1").unwrap();
        let link = CurationLink::new(sample.clone(), &curation, Owner::Domain("d".into()), Utc::now());
        assert!(store.put_link(&link).unwrap());
        assert!(!store.put_link(&link).unwrap());
        assert_eq!(store.links_for(&sample).unwrap().len(), 1);
    }
}
