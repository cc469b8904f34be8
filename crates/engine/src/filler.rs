//! Attribute filler
//!
//! Copies already-recorded values, row by row, from a source collection into a
//! destination collection. Name resolution and kind checks happen once at
//! construction; `fill` only moves values and never inspects them, so a new
//! value kind needs no change here.
//!
//! The requested names must cover every destination column: a fill appends a
//! complete destination row, which keeps the destination's row invariant.

use crate::collection::{CollectionId, HitsCollection};
use hitrec_core::{HitsError, HitsResult};

/// Resolved copy plan between two collections
#[derive(Debug, Clone)]
pub struct AttributeFiller {
    source_id: CollectionId,
    destination_id: CollectionId,
    /// Source column position for each destination column, in destination order
    source_columns: Vec<usize>,
    names: Vec<String>,
}

impl AttributeFiller {
    /// Resolve `names` in both collections
    ///
    /// # Errors
    /// - `Configuration` if `names` is empty, has duplicates, or leaves a
    ///   destination column without a source
    /// - `UnknownAttribute` if either collection lacks a name
    /// - `TypeMismatch` if the paired columns differ in kind
    pub fn new<S: AsRef<str>>(
        source: &HitsCollection,
        destination: &HitsCollection,
        names: &[S],
    ) -> HitsResult<Self> {
        if names.is_empty() {
            return Err(HitsError::configuration(format!(
                "filler from '{}' to '{}' copies no attributes",
                source.name(),
                destination.name()
            )));
        }

        let mut source_columns: Vec<Option<usize>> = vec![None; destination.columns().len()];
        for name in names {
            let name = name.as_ref();
            let s = source.column_index(name)?;
            let d = destination.column_index(name)?;

            let (src_col, dst_col) = (&source.columns()[s], &destination.columns()[d]);
            if src_col.kind() != dst_col.kind() {
                return Err(HitsError::TypeMismatch {
                    attribute: name.to_string(),
                    expected: dst_col.kind(),
                    actual: src_col.kind(),
                });
            }

            if source_columns[d].replace(s).is_some() {
                return Err(HitsError::configuration(format!(
                    "filler copies attribute '{}' twice",
                    name
                )));
            }
        }

        let source_columns = source_columns
            .into_iter()
            .zip(destination.columns())
            .map(|(s, col)| {
                s.ok_or_else(|| {
                    HitsError::configuration(format!(
                        "destination '{}' column '{}' has no source in the filler",
                        destination.name(),
                        col.name()
                    ))
                })
            })
            .collect::<HitsResult<Vec<_>>>()?;

        Ok(Self {
            source_id: source.id(),
            destination_id: destination.id(),
            source_columns,
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
        })
    }

    /// Attribute names copied, in the order they were requested
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Copy row `row_index` of `source` into a new row of `destination`
    ///
    /// # Errors
    /// - `Configuration` if called with collections other than the ones the
    ///   filler was built for
    /// - `IndexOutOfRange` if `row_index >= source.row_count()`
    pub fn fill(
        &self,
        source: &HitsCollection,
        destination: &mut HitsCollection,
        row_index: usize,
    ) -> HitsResult<()> {
        if source.id() != self.source_id || destination.id() != self.destination_id {
            return Err(HitsError::configuration(format!(
                "filler invoked with '{}' -> '{}', which it was not built for",
                source.name(),
                destination.name()
            )));
        }

        if row_index >= source.row_count() {
            return Err(HitsError::IndexOutOfRange {
                index: row_index,
                len: source.row_count(),
            });
        }

        let row = self
            .source_columns
            .iter()
            .map(|&s| source.columns()[s].value_at(row_index))
            .collect::<HitsResult<Vec<_>>>()?;
        destination.push_row(row)
    }
}
