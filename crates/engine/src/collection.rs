//! Hits collections
//!
//! A [`HitsCollection`] owns one column per requested attribute and grows by
//! exactly one row per accepted step or event.
//!
//! ## Row Invariant
//!
//! After any complete fill every column has `row_count()` values. A fill first
//! extracts and kind-checks the whole row, then appends; if anything fails
//! nothing is appended, so a partial row is never observable.
//!
//! ## Thread Safety
//!
//! A collection is owned by one worker thread. It is `Send` (it can be handed
//! to the end-of-run merge) but is not meant to be shared for writing.

use crate::registry::AttributeRegistry;
use hitrec_core::{AttributeColumn, AttributeValue, HitsError, HitsResult, StepView};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Unique identity of a collection instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollectionId(Uuid);

impl CollectionId {
    /// Create a new random id
    pub fn new() -> Self {
        CollectionId(Uuid::new_v4())
    }
}

impl Default for CollectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// When a collection records a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One row per accepted step
    #[default]
    Step,
    /// One row per accepted event
    Event,
}

/// Ordered set of typed columns filled one row at a time
#[derive(Debug)]
pub struct HitsCollection {
    id: CollectionId,
    name: String,
    granularity: Granularity,
    registry: Arc<AttributeRegistry>,
    columns: Vec<AttributeColumn>,
    index: FxHashMap<String, usize>,
    row_count: usize,
}

impl HitsCollection {
    /// Create a collection with one column per attribute, in the given order
    ///
    /// # Errors
    /// - `Configuration` if `attributes` is empty or contains duplicates
    /// - `UnknownAttribute` if an attribute is not in the registry
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        registry: Arc<AttributeRegistry>,
        attributes: &[S],
    ) -> HitsResult<Self> {
        let name = name.into();
        if attributes.is_empty() {
            return Err(HitsError::configuration(format!(
                "collection '{}' requests no attributes",
                name
            )));
        }

        let mut index = FxHashMap::default();
        for (i, attr) in attributes.iter().enumerate() {
            if index.insert(attr.as_ref().to_string(), i).is_some() {
                return Err(HitsError::configuration(format!(
                    "collection '{}' requests attribute '{}' twice",
                    name,
                    attr.as_ref()
                )));
            }
        }

        let columns = registry.create_columns_for(attributes)?;
        debug!(collection = %name, columns = columns.len(), "hits collection initialized");

        Ok(Self {
            id: CollectionId::new(),
            name,
            granularity: Granularity::default(),
            registry,
            columns,
            index,
            row_count: 0,
        })
    }

    /// Set the recording granularity
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Instance identity
    pub fn id(&self) -> CollectionId {
        self.id
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Recording granularity
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Registry the columns were resolved against
    pub fn registry(&self) -> &Arc<AttributeRegistry> {
        &self.registry
    }

    /// Number of complete rows
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[AttributeColumn] {
        &self.columns
    }

    /// Attribute names in declaration order
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name())
    }

    /// Check if the collection has a column for `name`
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Position of the column for `name`
    pub fn column_index(&self, name: &str) -> HitsResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| HitsError::unknown_attribute(name))
    }

    /// Column for `name`
    ///
    /// # Errors
    /// - `UnknownAttribute` if the collection has no such column
    pub fn get_column(&self, name: &str) -> HitsResult<&AttributeColumn> {
        let i = self.column_index(name)?;
        Ok(&self.columns[i])
    }

    /// Values of every column at `index`, in declaration order
    pub fn row(&self, index: usize) -> HitsResult<Vec<AttributeValue>> {
        if index >= self.row_count {
            return Err(HitsError::IndexOutOfRange {
                index,
                len: self.row_count,
            });
        }
        self.columns.iter().map(|c| c.value_at(index)).collect()
    }

    /// Record one row extracted from `step`
    ///
    /// All-or-nothing: if any attribute cannot be extracted the error is
    /// returned and no column is touched.
    ///
    /// # Errors
    /// - `ExtractionFailure` if the step cannot supply a value
    /// - `TypeMismatch` if an extractor produced the wrong kind
    pub fn fill_row(&mut self, step: &dyn StepView) -> HitsResult<()> {
        let values = self.extract_row(step)?;
        self.push_row(values)
    }

    /// Extract a full row from `step` without recording it
    ///
    /// The values are in declaration order and already kind-checked, ready
    /// for [`HitsCollection::push_row`].
    ///
    /// # Errors
    /// - `ExtractionFailure` if the step cannot supply a value
    /// - `TypeMismatch` if an extractor produced the wrong kind
    pub fn extract_row(&self, step: &dyn StepView) -> HitsResult<Vec<AttributeValue>> {
        self.columns
            .iter()
            .map(|c| self.registry.extract(c.name(), step))
            .collect()
    }

    /// Append a complete row of values, in declaration order
    ///
    /// The whole row is checked before anything is appended.
    ///
    /// # Errors
    /// - `Configuration` if the row width differs from the column count
    /// - `TypeMismatch` if a value kind differs from its column kind
    pub fn push_row(&mut self, values: Vec<AttributeValue>) -> HitsResult<()> {
        if values.len() != self.columns.len() {
            return Err(HitsError::configuration(format!(
                "row of width {} pushed into collection '{}' with {} columns",
                values.len(),
                self.name,
                self.columns.len()
            )));
        }

        for (column, value) in self.columns.iter().zip(&values) {
            if column.kind() != value.kind() {
                return Err(HitsError::TypeMismatch {
                    attribute: column.name().to_string(),
                    expected: column.kind(),
                    actual: value.kind(),
                });
            }
        }

        for (column, value) in self.columns.iter_mut().zip(values) {
            column.append(value)?;
        }
        self.row_count += 1;
        Ok(())
    }

    /// Drop every row from `rows` on; no-op if there are fewer rows
    pub fn truncate(&mut self, rows: usize) {
        if rows >= self.row_count {
            return;
        }
        for column in &mut self.columns {
            column.truncate(rows);
        }
        self.row_count = rows;
    }

    /// Clear every column to zero rows
    ///
    /// Only call at a run boundary, when no fill is in flight.
    pub fn reset(&mut self) {
        for column in &mut self.columns {
            column.clear();
        }
        debug!(collection = %self.name, dropped_rows = self.row_count, "hits collection reset");
        self.row_count = 0;
    }
}
