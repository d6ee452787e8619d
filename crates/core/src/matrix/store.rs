//! In-memory override store keyed by `(month, concept)`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::MatrixError;
use super::types::{MatrixConcept, OverrideKey};

/// A persisted override as a flat record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRecord {
    /// Month number, starting at 1.
    pub month: u32,
    /// Row concept.
    pub concept: MatrixConcept,
    /// The user's literal input.
    pub value: String,
}

/// Overrides of one budget's matrix.
///
/// A cell is overridden exactly when an entry exists for its key, even if the
/// stored text equals the computed value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideStore {
    cells: BTreeMap<OverrideKey, String>,
}

impl OverrideStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from persisted records. Later records win on duplicate keys.
    ///
    /// # Errors
    ///
    /// Returns `MatrixError::InvalidMonth` if a record has month 0.
    pub fn from_records<I>(records: I) -> Result<Self, MatrixError>
    where
        I: IntoIterator<Item = OverrideRecord>,
    {
        let mut store = Self::new();
        for record in records {
            store.save_override(record.month, record.concept, record.value)?;
        }
        Ok(store)
    }

    /// Inserts or replaces the override of a cell. The value is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns `MatrixError::InvalidMonth` if `month` is 0.
    pub fn save_override(
        &mut self,
        month: u32,
        concept: MatrixConcept,
        raw_value: impl Into<String>,
    ) -> Result<(), MatrixError> {
        let key = OverrideKey::new(month, concept)?;
        self.cells.insert(key, raw_value.into());
        Ok(())
    }

    /// Removes the override of a cell. Returns whether one existed.
    pub fn delete_override(&mut self, month: u32, concept: MatrixConcept) -> bool {
        self.cells.remove(&OverrideKey { month, concept }).is_some()
    }

    /// Whether the cell is overridden.
    #[must_use]
    pub fn has_override(&self, month: u32, concept: MatrixConcept) -> bool {
        self.cells.contains_key(&OverrideKey { month, concept })
    }

    /// The override text of a cell.
    #[must_use]
    pub fn get(&self, month: u32, concept: MatrixConcept) -> Option<&str> {
        self.cells
            .get(&OverrideKey { month, concept })
            .map(String::as_str)
    }

    /// Months that have at least one override, ascending.
    #[must_use]
    pub fn months(&self) -> Vec<u32> {
        let mut months: Vec<u32> = self.cells.keys().map(|key| key.month).collect();
        months.dedup();
        months
    }

    /// Returns all overrides ordered by month, then concept.
    #[must_use]
    pub fn records(&self) -> Vec<OverrideRecord> {
        self.cells
            .iter()
            .map(|(key, value)| OverrideRecord {
                month: key.month,
                concept: key.concept,
                value: value.clone(),
            })
            .collect()
    }

    /// Number of overridden cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is overridden.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
