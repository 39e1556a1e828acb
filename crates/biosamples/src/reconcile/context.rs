//! Caller context for a write: who is writing, how much they are trusted and
//! which channel the submission came through.

use serde::{Deserialize, Serialize};

use crate::model::{Owner, SubmissionChannel};

/// Whether the caller may override protected invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    #[default]
    Ordinary,
    /// Superusers, import pipelines and ENA-posting identities.
    Privileged,
}

/// Authorization context supplied by the caller for one write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteContext {
    pub identity: Owner,
    #[serde(default)]
    pub trust: TrustLevel,
    #[serde(default)]
    pub channel: SubmissionChannel,
}

impl WriteContext {
    /// An ordinary caller submitting through `channel`.
    pub fn new(identity: Owner, channel: SubmissionChannel) -> Self {
        Self {
            identity,
            trust: TrustLevel::Ordinary,
            channel,
        }
    }

    /// Set the trust level.
    pub fn with_trust(mut self, trust: TrustLevel) -> Self {
        self.trust = trust;
        self
    }

    /// Mark the caller as privileged.
    pub fn privileged(self) -> Self {
        self.with_trust(TrustLevel::Privileged)
    }

    pub fn is_privileged(&self) -> bool {
        self.trust == TrustLevel::Privileged
    }

    /// Whether relationships owned by the stored record survive a submission
    /// that omits them.
    pub fn retains_owned_relationships(&self) -> bool {
        self.is_privileged() && self.channel != SubmissionChannel::FileUpload
    }
}
