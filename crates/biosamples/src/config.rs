//! Registry configuration.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::accession::Namespace;
use crate::error::{BioSamplesError, Result};

static PREFIX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]+$").expect("prefix pattern is valid"));

/// Prefix and sequence name for one accession namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    /// Alphabetic accession prefix, e.g. `SAMEA`.
    pub prefix: String,
    /// Name of the counter in the sequence store.
    pub sequence: String,
}

impl NamespaceConfig {
    pub fn new(prefix: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            sequence: sequence.into(),
        }
    }
}

/// Accession namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessionConfig {
    pub sample: NamespaceConfig,
    pub group: NamespaceConfig,
    pub sra: NamespaceConfig,
}

impl Default for AccessionConfig {
    fn default() -> Self {
        Self {
            sample: NamespaceConfig::new("SAMEA", "sample"),
            group: NamespaceConfig::new("SAMEG", "group"),
            sra: NamespaceConfig::new("ERS", "sra"),
        }
    }
}

impl AccessionConfig {
    /// Settings for a namespace.
    pub fn namespace(&self, namespace: Namespace) -> &NamespaceConfig {
        match namespace {
            Namespace::Sample => &self.sample,
            Namespace::Group => &self.group,
            Namespace::Sra => &self.sra,
        }
    }

    fn validate(&self) -> Result<()> {
        for namespace in Namespace::ALL {
            let settings = self.namespace(namespace);
            if !PREFIX_PATTERN.is_match(&settings.prefix) {
                return Err(BioSamplesError::Config(format!(
                    "{} prefix '{}' must be uppercase letters only",
                    namespace.label(),
                    settings.prefix
                )));
            }
            if settings.sequence.trim().is_empty() {
                return Err(BioSamplesError::Config(format!(
                    "{} sequence name must not be blank",
                    namespace.label()
                )));
            }
        }

        let mut sequences: Vec<_> = Namespace::ALL
            .iter()
            .map(|ns| self.namespace(*ns).sequence.as_str())
            .collect();
        sequences.sort_unstable();
        sequences.dedup();
        if sequences.len() != Namespace::ALL.len() {
            return Err(BioSamplesError::Config(
                "each namespace needs its own sequence".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration for the write path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Accession namespaces.
    #[serde(default)]
    pub accessions: AccessionConfig,

    /// Copy stored structured data into submissions that omit it.
    #[serde(default = "default_true")]
    pub retain_structured_data: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            accessions: AccessionConfig::default(),
            retain_structured_data: true,
        }
    }
}

impl RegistryConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the accession namespaces.
    pub fn with_accessions(mut self, accessions: AccessionConfig) -> Self {
        self.accessions = accessions;
        self
    }

    /// Set the sample accession prefix.
    pub fn with_sample_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.accessions.sample.prefix = prefix.into();
        self
    }

    /// Set the group accession prefix.
    pub fn with_group_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.accessions.group.prefix = prefix.into();
        self
    }

    /// Set the SRA accession prefix.
    pub fn with_sra_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.accessions.sra.prefix = prefix.into();
        self
    }

    /// Enable or disable structured-data retention.
    pub fn with_retain_structured_data(mut self, retain: bool) -> Self {
        self.retain_structured_data = retain;
        self
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        self.accessions.validate()
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| BioSamplesError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: RegistryConfig =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                BioSamplesError::Config(format!(
                    "Failed to parse config '{}': {}",
                    path.display(),
                    e
                ))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| BioSamplesError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let file = File::create(path).map_err(|e| BioSamplesError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
