//! Reconciliation of incoming submissions against stored records.
//!
//! One call per write:
//!
//! 1. validate the incoming record;
//! 2. check the accession against the stored record and the caller's trust;
//! 3. resolve timestamps per channel ([`dates`]);
//! 4. retain owned relationships for privileged, non-upload callers;
//! 5. enforce the single, immutable SRA accession;
//! 6. keep stored structured data the submitter did not resend;
//! 7. allocate an accession if the record has none.
//!
//! Every check runs before any allocation.

mod context;
pub mod dates;
mod engine;

pub use context::{TrustLevel, WriteContext};
pub use dates::Timestamps;
pub use engine::{ReconcileOutcome, Reconciliation, ReconciliationEngine, WriteAttempt, WriteState};
