//! Directory-backed store: one JSON file per record, curation and link.
//!
//! ```text
//! root/
//! ├── samples/SAMEA123.json
//! ├── curations/<hash>.json
//! ├── links/<hash>.json
//! └── sequences.json
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::accession::Accession;
use crate::canonical::ContentHash;
use crate::curation::{Curation, CurationLink};
use crate::error::{BioSamplesError, Result};
use crate::model::Sample;

use super::{CurationRepository, SampleRepository, SequenceStore};

const SAMPLES_DIR: &str = "samples";
const CURATIONS_DIR: &str = "curations";
const LINKS_DIR: &str = "links";
const SEQUENCES_FILE: &str = "sequences.json";

/// Store persisting JSON files under a root directory.
///
/// Every write goes to a uniquely named temporary file that is then renamed
/// over the target, so readers never observe a half-written file and
/// concurrent writes to one key resolve last-write-wins. Sequence increments are
/// serialized by an in-process lock; a directory must not be shared between
/// processes.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    sequence_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        for dir in [SAMPLES_DIR, CURATIONS_DIR, LINKS_DIR] {
            let path = root.join(dir);
            fs::create_dir_all(&path).map_err(|e| unavailable(&path, e))?;
        }
        debug!(root = %root.display(), "Opened file store");

        Ok(Self {
            root,
            sequence_lock: Mutex::new(()),
        })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn sample_path(&self, accession: &Accession) -> PathBuf {
        self.root.join(SAMPLES_DIR).join(format!("{}.json", accession))
    }

    fn curation_path(&self, hash: &ContentHash) -> PathBuf {
        self.root.join(CURATIONS_DIR).join(format!("{}.json", hash))
    }

    fn link_path(&self, hash: &ContentHash) -> PathBuf {
        self.root.join(LINKS_DIR).join(format!("{}.json", hash))
    }

    fn read_sequences(&self) -> Result<BTreeMap<String, u64>> {
        Ok(read_json(&self.root.join(SEQUENCES_FILE))?.unwrap_or_default())
    }
}

fn unavailable(path: &Path, e: io::Error) -> BioSamplesError {
    BioSamplesError::StoreUnavailable(format!("'{}': {}", path.display(), e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(unavailable(path, e)),
    };

    let value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        BioSamplesError::Persistence(format!("Failed to parse '{}': {}", path.display(), e))
    })?;
    Ok(Some(value))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));

    // Unique per call, so concurrent writers to one key never share a temp file.
    let tmp = NamedTempFile::new_in(dir).map_err(|e| unavailable(dir, e))?;
    let mut writer = BufWriter::new(tmp);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| {
        BioSamplesError::Persistence(format!("Failed to serialize '{}': {}", path.display(), e))
    })?;
    writer.flush().map_err(|e| unavailable(path, e))?;
    let tmp = writer
        .into_inner()
        .map_err(|e| unavailable(path, e.into_error()))?;

    tmp.persist(path).map_err(|e| unavailable(path, e.error))?;
    debug!(path = %path.display(), "Wrote file");
    Ok(())
}

impl SampleRepository for JsonFileStore {
    fn get(&self, accession: &Accession) -> Result<Option<Sample>> {
        read_json(&self.sample_path(accession))
    }

    fn put(&self, sample: &Sample) -> Result<()> {
        let accession = sample.accession.as_ref().ok_or_else(|| {
            BioSamplesError::Persistence(format!("record '{}' has no accession", sample.name))
        })?;
        write_json(&self.sample_path(accession), sample)
    }
}

impl SequenceStore for JsonFileStore {
    fn next_value(&self, sequence: &str) -> Result<u64> {
        let _guard = self
            .sequence_lock
            .lock()
            .map_err(|_| BioSamplesError::StoreUnavailable("sequence lock poisoned".into()))?;

        let mut sequences = self.read_sequences()?;
        let counter = sequences.entry(sequence.to_string()).or_insert(0);
        *counter += 1;
        let value = *counter;

        write_json(&self.root.join(SEQUENCES_FILE), &sequences)?;
        Ok(value)
    }
}

impl CurationRepository for JsonFileStore {
    fn get_curation(&self, hash: &ContentHash) -> Result<Option<Curation>> {
        read_json(&self.curation_path(hash))
    }

    fn put_curation(&self, curation: &Curation) -> Result<bool> {
        let path = self.curation_path(curation.hash());
        if path.exists() {
            return Ok(false);
        }
        write_json(&path, curation)?;
        Ok(true)
    }

    fn put_link(&self, link: &CurationLink) -> Result<bool> {
        let path = self.link_path(link.hash());
        if path.exists() {
            return Ok(false);
        }
        write_json(&path, link)?;
        Ok(true)
    }

    fn links_for(&self, sample: &Accession) -> Result<Vec<CurationLink>> {
        let dir = self.root.join(LINKS_DIR);
        let entries = fs::read_dir(&dir).map_err(|e| unavailable(&dir, e))?;

        let mut links = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| unavailable(&dir, e))?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            if let Some(link) = read_json::<CurationLink>(&path)? {
                if link.sample() == sample {
                    links.push(link);
                }
            }
        }

        links.sort_by_key(|link| link.created());
        Ok(links)
    }
}
