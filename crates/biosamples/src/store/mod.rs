//! Repository interfaces and their in-memory and file-backed implementations.
//!
//! The store is the single source of truth. Implementations must provide
//! read-after-write consistency per key and an atomic increment for each
//! named sequence; beyond that, concurrent writes to one record may resolve
//! last-write-wins.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::accession::Accession;
use crate::canonical::ContentHash;
use crate::curation::{Curation, CurationLink};
use crate::error::Result;
use crate::model::Sample;

/// Authoritative storage of sample records keyed by accession.
pub trait SampleRepository: Send + Sync {
    /// Fetch the stored record, `None` when there is none.
    fn get(&self, accession: &Accession) -> Result<Option<Sample>>;

    /// Replace the stored record wholesale. The record must be accessioned.
    fn put(&self, sample: &Sample) -> Result<()>;
}

/// Named, durable, atomically incrementing counters.
pub trait SequenceStore: Send + Sync {
    /// Increment the counter and return the new value.
    ///
    /// Two calls on the same sequence never return the same value.
    fn next_value(&self, sequence: &str) -> Result<u64>;
}

/// Storage of content-addressed curations and their links.
pub trait CurationRepository: Send + Sync {
    fn get_curation(&self, hash: &ContentHash) -> Result<Option<Curation>>;

    /// Store a curation under its hash. Returns `false` if it was already there.
    fn put_curation(&self, curation: &Curation) -> Result<bool>;

    /// Store a link under its hash. Returns `false` if it was already there.
    fn put_link(&self, link: &CurationLink) -> Result<bool>;

    /// All links attached to `sample`, ordered by creation time.
    fn links_for(&self, sample: &Accession) -> Result<Vec<CurationLink>>;
}
