//! Timestamp precedence per submission channel.
//!
//! Each function takes the incoming record and the stored one (`None` when
//! there is none) and picks the first value present in the channel's order.

use chrono::{DateTime, Utc};

use crate::model::{Sample, SubmissionChannel};

type Stamp = Option<DateTime<Utc>>;

/// The four timestamps of a record about to be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamps {
    pub create: DateTime<Utc>,
    pub submitted: DateTime<Utc>,
    pub release: Option<DateTime<Utc>>,
    pub update: DateTime<Utc>,
}

impl Timestamps {
    /// Resolve every timestamp; anything still undecided becomes `now`.
    pub fn resolve(
        incoming: &Sample,
        existing: Option<&Sample>,
        channel: SubmissionChannel,
        old_record_empty: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            create: create_date(incoming, existing, channel).unwrap_or(now),
            submitted: submitted_date(incoming, existing, channel, old_record_empty)
                .unwrap_or(now),
            release: incoming.release,
            update: update_date(incoming, existing, channel).unwrap_or(now),
        }
    }
}

fn stored(existing: Option<&Sample>, field: impl Fn(&Sample) -> Stamp) -> Stamp {
    existing.and_then(field)
}

/// NCBI imports carry the authoritative create date; everyone else keeps the
/// stored one.
pub fn create_date(incoming: &Sample, existing: Option<&Sample>, channel: SubmissionChannel) -> Stamp {
    let old_create = stored(existing, |s| s.create);
    match channel {
        SubmissionChannel::PipelineNcbi => incoming
            .create
            .or(old_create)
            .or_else(|| stored(existing, |s| s.update)),
        SubmissionChannel::PipelineEna
        | SubmissionChannel::FileUpload
        | SubmissionChannel::InteractiveApi => old_create.or(incoming.create),
    }
}

/// A record with no prior metadata counts as newly submitted.
pub fn submitted_date(
    incoming: &Sample,
    existing: Option<&Sample>,
    channel: SubmissionChannel,
    old_record_empty: bool,
) -> Stamp {
    if old_record_empty {
        return incoming.submitted;
    }

    let old_submitted = stored(existing, |s| s.submitted);
    match channel {
        SubmissionChannel::PipelineNcbi => incoming
            .submitted
            .or(old_submitted)
            .or_else(|| stored(existing, |s| s.create)),
        SubmissionChannel::PipelineEna => old_submitted.or(incoming.submitted),
        SubmissionChannel::FileUpload | SubmissionChannel::InteractiveApi => old_submitted
            .or_else(|| stored(existing, |s| s.create))
            .or_else(|| stored(existing, |s| s.update)),
    }
}

/// Pipelines replay the archive's update date; any other write is an update now.
pub fn update_date(incoming: &Sample, existing: Option<&Sample>, channel: SubmissionChannel) -> Stamp {
    if channel.is_pipeline() {
        incoming.update.or_else(|| stored(existing, |s| s.update))
    } else {
        None
    }
}
