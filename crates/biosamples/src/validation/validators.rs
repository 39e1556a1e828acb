//! Validators for checking a record before reconciliation.

use crate::accession::Accession;
use crate::model::{Sample, SRA_ACCESSION};

use super::issue::ValidationIssue;

/// Trait for validators.
///
/// Implementations must be pure: the same record always yields the same
/// issues and nothing is written anywhere.
pub trait SampleValidator: Send + Sync {
    /// Run validation and return issues; empty means valid.
    fn validate(&self, sample: &Sample) -> Vec<ValidationIssue>;
}

/// Checks that the name and release date are present.
pub struct RequiredFieldValidator;

impl SampleValidator for RequiredFieldValidator {
    fn validate(&self, sample: &Sample) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if sample.name.trim().is_empty() {
            issues.push(ValidationIssue::new("name", "must not be blank"));
        }
        if sample.release.is_none() {
            issues.push(ValidationIssue::new("release", "is required"));
        }

        issues
    }
}

/// Checks attribute types and values, and that there is at most one
/// SRA accession.
pub struct AttributeValidator;

impl SampleValidator for AttributeValidator {
    fn validate(&self, sample: &Sample) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for attribute in &sample.attributes {
            if attribute.attribute_type.is_empty() {
                issues.push(ValidationIssue::new(
                    "characteristics",
                    format!("attribute with value '{}' has no type", attribute.value),
                ));
            } else if attribute.value.is_empty() {
                issues.push(ValidationIssue::new(
                    format!("characteristics.{}", attribute.attribute_type),
                    "value must not be blank",
                ));
            }
        }

        let sra = sample.sra_accession_attributes();
        if sra.len() > 1 {
            let values: Vec<&str> = sra.iter().map(|attr| attr.value.as_str()).collect();
            issues.push(ValidationIssue::new(
                format!("characteristics.{}", SRA_ACCESSION),
                format!("only one allowed, found {}", values.join(", ")),
            ));
        }

        issues
    }
}

/// Checks relationship types, targets and sources.
pub struct RelationshipValidator;

impl SampleValidator for RelationshipValidator {
    fn validate(&self, sample: &Sample) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for relationship in &sample.relationships {
            if relationship.relationship_type.trim().is_empty() {
                issues.push(ValidationIssue::new(
                    "relationships.type",
                    format!("missing for target '{}'", relationship.target),
                ));
            }
            if relationship.target.trim().is_empty() {
                issues.push(ValidationIssue::new(
                    "relationships.target",
                    format!("missing for '{}' relationship", relationship.relationship_type),
                ));
            }
            if let Some(source) = relationship.source.as_deref() {
                let source = source.trim();
                if !source.is_empty() && !Accession::is_valid(source) {
                    issues.push(ValidationIssue::new(
                        "relationships.source",
                        format!("'{}' is not an accession", source),
                    ));
                }
            }
        }

        issues
    }
}

/// Runs a list of validators and concatenates their issues.
pub struct ValidationEngine {
    validators: Vec<Box<dyn SampleValidator>>,
}

impl ValidationEngine {
    /// Create a validation engine with all default validators.
    pub fn new() -> Self {
        Self {
            validators: vec![
                Box::new(RequiredFieldValidator),
                Box::new(AttributeValidator),
                Box::new(RelationshipValidator),
            ],
        }
    }

    /// Create an engine with no validators.
    pub fn empty() -> Self {
        Self {
            validators: Vec::new(),
        }
    }

    /// Add a validator.
    pub fn with_validator(mut self, validator: impl SampleValidator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }
}

impl SampleValidator for ValidationEngine {
    fn validate(&self, sample: &Sample) -> Vec<ValidationIssue> {
        self.validators
            .iter()
            .flat_map(|validator| validator.validate(sample))
            .collect()
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}
