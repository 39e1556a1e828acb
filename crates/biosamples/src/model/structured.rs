//! Structured data tables attached to a sample (AMR results, breed data, ...).

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::sample::Owner;

/// One cell of a structured data table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StructuredCell {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iri: Option<String>,
}

impl StructuredCell {
    /// Create a plain cell.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            iri: None,
        }
    }
}

/// A typed table of rows. Column order within a row is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDataTable {
    /// Table type, e.g. `AMR`.
    #[serde(rename = "type")]
    pub data_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,

    #[serde(default)]
    pub content: Vec<IndexMap<String, StructuredCell>>,
}

impl StructuredDataTable {
    /// Create an empty table of the given type.
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            schema: None,
            owner: None,
            content: Vec::new(),
        }
    }

    /// Set the owning identity.
    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Append a row given as `(column, value)` pairs.
    pub fn with_row<I, K, V>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let row = cells
            .into_iter()
            .map(|(column, value)| (column.into(), StructuredCell::new(value)))
            .collect();
        self.content.push(row);
        self
    }
}

// Rows compare cell-by-cell in column order so that equality agrees with Ord.
impl Ord for StructuredDataTable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data_type
            .cmp(&other.data_type)
            .then_with(|| self.schema.cmp(&other.schema))
            .then_with(|| self.owner.cmp(&other.owner))
            .then_with(|| {
                self.content
                    .iter()
                    .map(|row| row.iter().collect::<Vec<_>>())
                    .cmp(other.content.iter().map(|row| row.iter().collect::<Vec<_>>()))
            })
    }
}

impl PartialOrd for StructuredDataTable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for StructuredDataTable {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StructuredDataTable {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_order_preserved_in_json() {
        let table = StructuredDataTable::new("AMR")
            .with_row([("antibioticName", "ampicillin"), ("resistancePhenotype", "resistant")]);

        let json = serde_json::to_string(&table).unwrap();
        let antibiotic = json.find("antibioticName").unwrap();
        let phenotype = json.find("resistancePhenotype").unwrap();
        assert!(antibiotic < phenotype);
    }

    #[test]
    fn test_equality_respects_column_order() {
        let a = StructuredDataTable::new("AMR").with_row([("a", "1"), ("b", "2")]);
        let b = StructuredDataTable::new("AMR").with_row([("b", "2"), ("a", "1")]);
        let c = StructuredDataTable::new("AMR").with_row([("a", "1"), ("b", "2")]);

        assert_ne!(a, b);
        assert_eq!(a, c);
    }
}
