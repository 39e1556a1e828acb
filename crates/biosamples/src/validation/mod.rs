//! Structural checks on incoming records.
//!
//! Validators inspect a record and report issues; they never mutate it. The
//! reconciliation engine rejects any write with at least one issue.

mod issue;
mod validators;

pub use issue::ValidationIssue;
pub use validators::{
    AttributeValidator, RelationshipValidator, RequiredFieldValidator, SampleValidator,
    ValidationEngine,
};
