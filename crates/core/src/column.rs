//! Attribute columns
//!
//! An [`AttributeColumn`] is one named, append-only sequence of values of a
//! single [`AttributeKind`]. The kind is fixed at construction; the storage
//! is a tagged sum over the four typed vectors so reads come back unboxed.
//!
//! Columns never shrink during normal operation. The only way to drop values
//! is [`AttributeColumn::clear`], used by whole-collection resets.

use crate::error::{HitsError, HitsResult};
use crate::value::{AttributeKind, AttributeValue, ThreeVector};
use serde::Serialize;

/// Typed storage behind a column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnValues {
    /// Real numbers
    Double(Vec<f64>),
    /// Integers
    Int(Vec<i64>),
    /// Strings
    String(Vec<String>),
    /// 3-vectors
    Vector3(Vec<ThreeVector>),
}

impl ColumnValues {
    /// Empty storage for `kind`
    pub fn empty(kind: AttributeKind) -> Self {
        match kind {
            AttributeKind::Double => ColumnValues::Double(Vec::new()),
            AttributeKind::Int => ColumnValues::Int(Vec::new()),
            AttributeKind::String => ColumnValues::String(Vec::new()),
            AttributeKind::Vector3 => ColumnValues::Vector3(Vec::new()),
        }
    }

    /// Kind of the stored values
    pub fn kind(&self) -> AttributeKind {
        match self {
            ColumnValues::Double(_) => AttributeKind::Double,
            ColumnValues::Int(_) => AttributeKind::Int,
            ColumnValues::String(_) => AttributeKind::String,
            ColumnValues::Vector3(_) => AttributeKind::Vector3,
        }
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Double(v) => v.len(),
            ColumnValues::Int(v) => v.len(),
            ColumnValues::String(v) => v.len(),
            ColumnValues::Vector3(v) => v.len(),
        }
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self) {
        match self {
            ColumnValues::Double(v) => v.clear(),
            ColumnValues::Int(v) => v.clear(),
            ColumnValues::String(v) => v.clear(),
            ColumnValues::Vector3(v) => v.clear(),
        }
    }

    fn truncate(&mut self, len: usize) {
        match self {
            ColumnValues::Double(v) => v.truncate(len),
            ColumnValues::Int(v) => v.truncate(len),
            ColumnValues::String(v) => v.truncate(len),
            ColumnValues::Vector3(v) => v.truncate(len),
        }
    }
}

/// One named, typed sequence of recorded values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeColumn {
    name: String,
    #[serde(flatten)]
    values: ColumnValues,
}

impl AttributeColumn {
    /// Create an empty column
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::empty(kind),
        }
    }

    /// Attribute name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind fixed at construction
    pub fn kind(&self) -> AttributeKind {
        self.values.kind()
    }

    /// Current number of values
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw typed storage
    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    fn mismatch(&self, actual: AttributeKind) -> HitsError {
        HitsError::TypeMismatch {
            attribute: self.name.clone(),
            expected: self.kind(),
            actual,
        }
    }

    // ========================================================================
    // Appends
    // ========================================================================

    /// Append a real number
    ///
    /// # Errors
    /// - `TypeMismatch` if the column does not hold doubles
    pub fn append_double(&mut self, v: f64) -> HitsResult<()> {
        match &mut self.values {
            ColumnValues::Double(vals) => {
                vals.push(v);
                Ok(())
            }
            _ => Err(self.mismatch(AttributeKind::Double)),
        }
    }

    /// Append an integer
    ///
    /// # Errors
    /// - `TypeMismatch` if the column does not hold integers
    pub fn append_int(&mut self, v: i64) -> HitsResult<()> {
        match &mut self.values {
            ColumnValues::Int(vals) => {
                vals.push(v);
                Ok(())
            }
            _ => Err(self.mismatch(AttributeKind::Int)),
        }
    }

    /// Append a string
    ///
    /// # Errors
    /// - `TypeMismatch` if the column does not hold strings
    pub fn append_string(&mut self, v: impl Into<String>) -> HitsResult<()> {
        match &mut self.values {
            ColumnValues::String(vals) => {
                vals.push(v.into());
                Ok(())
            }
            _ => Err(self.mismatch(AttributeKind::String)),
        }
    }

    /// Append a 3-vector
    ///
    /// # Errors
    /// - `TypeMismatch` if the column does not hold 3-vectors
    pub fn append_vector3(&mut self, v: ThreeVector) -> HitsResult<()> {
        match &mut self.values {
            ColumnValues::Vector3(vals) => {
                vals.push(v);
                Ok(())
            }
            _ => Err(self.mismatch(AttributeKind::Vector3)),
        }
    }

    /// Append a value of any kind, dispatching on its tag
    pub fn append(&mut self, value: AttributeValue) -> HitsResult<()> {
        match value {
            AttributeValue::Double(d) => self.append_double(d),
            AttributeValue::Int(i) => self.append_int(i),
            AttributeValue::String(s) => self.append_string(s),
            AttributeValue::Vector3(v) => self.append_vector3(v),
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All values as doubles
    pub fn values_as_double(&self) -> HitsResult<&[f64]> {
        match &self.values {
            ColumnValues::Double(vals) => Ok(vals),
            _ => Err(self.mismatch(AttributeKind::Double)),
        }
    }

    /// All values as integers
    pub fn values_as_int(&self) -> HitsResult<&[i64]> {
        match &self.values {
            ColumnValues::Int(vals) => Ok(vals),
            _ => Err(self.mismatch(AttributeKind::Int)),
        }
    }

    /// All values as strings
    pub fn values_as_string(&self) -> HitsResult<&[String]> {
        match &self.values {
            ColumnValues::String(vals) => Ok(vals),
            _ => Err(self.mismatch(AttributeKind::String)),
        }
    }

    /// All values as 3-vectors
    pub fn values_as_vector3(&self) -> HitsResult<&[ThreeVector]> {
        match &self.values {
            ColumnValues::Vector3(vals) => Ok(vals),
            _ => Err(self.mismatch(AttributeKind::Vector3)),
        }
    }

    /// Copy of the value stored at `index`
    ///
    /// # Errors
    /// - `IndexOutOfRange` if `index >= size()`
    pub fn value_at(&self, index: usize) -> HitsResult<AttributeValue> {
        let out_of_range = || HitsError::IndexOutOfRange {
            index,
            len: self.size(),
        };
        let value = match &self.values {
            ColumnValues::Double(v) => v.get(index).copied().map(AttributeValue::Double),
            ColumnValues::Int(v) => v.get(index).copied().map(AttributeValue::Int),
            ColumnValues::String(v) => v.get(index).cloned().map(AttributeValue::String),
            ColumnValues::Vector3(v) => v.get(index).copied().map(AttributeValue::Vector3),
        };
        value.ok_or_else(out_of_range)
    }

    /// Drop every value, keeping the name and kind
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Keep only the first `len` values; no-op if the column is shorter
    pub fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod append_tests {
        use super::*;

        #[test]
        fn test_append_matching_kind() {
            let mut col = AttributeColumn::new("edep", AttributeKind::Double);
            col.append_double(1.5).unwrap();
            col.append_double(0.0).unwrap();
            assert_eq!(col.size(), 2);
            assert_eq!(col.values_as_double().unwrap(), &[1.5, 0.0]);
        }

        #[test]
        fn test_append_wrong_kind_fails() {
            let mut col = AttributeColumn::new("edep", AttributeKind::Double);
            let err = col.append_string("gamma").unwrap_err();
            assert_eq!(
                err,
                HitsError::TypeMismatch {
                    attribute: "edep".into(),
                    expected: AttributeKind::Double,
                    actual: AttributeKind::String,
                }
            );
            assert!(col.is_empty());
        }

        #[test]
        fn test_append_dispatches_on_tag() {
            let mut col = AttributeColumn::new("pos", AttributeKind::Vector3);
            col.append(AttributeValue::Vector3(ThreeVector::new(1.0, 2.0, 3.0)))
                .unwrap();
            assert!(col.append(AttributeValue::Int(3)).is_err());
            assert_eq!(col.size(), 1);
        }

        #[test]
        fn test_every_kind_rejects_every_other_kind() {
            let samples = [
                AttributeValue::Double(1.0),
                AttributeValue::Int(1),
                AttributeValue::String("a".into()),
                AttributeValue::Vector3(ThreeVector::default()),
            ];
            for kind in AttributeKind::ALL {
                let mut col = AttributeColumn::new("c", kind);
                for sample in &samples {
                    let result = col.append(sample.clone());
                    assert_eq!(result.is_ok(), sample.kind() == kind);
                }
                assert_eq!(col.size(), 1);
            }
        }
    }

    mod read_tests {
        use super::*;

        #[test]
        fn test_values_wrong_kind_fails() {
            let col = AttributeColumn::new("track", AttributeKind::Int);
            assert!(col.values_as_int().is_ok());
            assert!(matches!(
                col.values_as_double(),
                Err(HitsError::TypeMismatch { .. })
            ));
            assert!(col.values_as_string().is_err());
            assert!(col.values_as_vector3().is_err());
        }

        #[test]
        fn test_value_at() {
            let mut col = AttributeColumn::new("particle", AttributeKind::String);
            col.append_string("gamma").unwrap();
            col.append_string("e-").unwrap();
            assert_eq!(col.value_at(1).unwrap(), AttributeValue::from("e-"));
            assert_eq!(
                col.value_at(2).unwrap_err(),
                HitsError::IndexOutOfRange { index: 2, len: 2 }
            );
        }

        #[test]
        fn test_clear_keeps_kind() {
            let mut col = AttributeColumn::new("id", AttributeKind::Int);
            col.append_int(4).unwrap();
            col.clear();
            assert_eq!(col.size(), 0);
            assert_eq!(col.kind(), AttributeKind::Int);
            assert_eq!(col.name(), "id");
        }

        #[test]
        fn test_truncate() {
            let mut col = AttributeColumn::new("particle", AttributeKind::String);
            for p in ["gamma", "e-", "e+"] {
                col.append_string(p).unwrap();
            }
            col.truncate(1);
            assert_eq!(col.values_as_string().unwrap(), &["gamma".to_string()]);
            col.truncate(5);
            assert_eq!(col.size(), 1);
        }
    }

    fn value_of(kind: AttributeKind) -> BoxedStrategy<AttributeValue> {
        match kind {
            AttributeKind::Double => any::<f64>()
                .prop_filter("NaN never compares equal", |v| !v.is_nan())
                .prop_map(AttributeValue::Double)
                .boxed(),
            AttributeKind::Int => any::<i64>().prop_map(AttributeValue::Int).boxed(),
            AttributeKind::String => "[a-zA-Z0-9+-]{0,12}"
                .prop_map(AttributeValue::String)
                .boxed(),
            AttributeKind::Vector3 => (-1e6..1e6f64, -1e6..1e6f64, -1e6..1e6f64)
                .prop_map(|(x, y, z)| AttributeValue::Vector3(ThreeVector::new(x, y, z)))
                .boxed(),
        }
    }

    fn kind_and_values() -> impl Strategy<Value = (AttributeKind, Vec<AttributeValue>)> {
        prop::sample::select(AttributeKind::ALL.to_vec())
            .prop_flat_map(|kind| (Just(kind), prop::collection::vec(value_of(kind), 0..32)))
    }

    proptest! {
        #[test]
        fn prop_append_then_value_at_returns_same_values((kind, values) in kind_and_values()) {
            let mut col = AttributeColumn::new("c", kind);
            for v in &values {
                col.append(v.clone()).unwrap();
            }
            prop_assert_eq!(col.size(), values.len());
            for (i, v) in values.iter().enumerate() {
                prop_assert_eq!(&col.value_at(i).unwrap(), v);
            }
            prop_assert!(col.value_at(values.len()).is_err());
        }
    }

    #[test]
    fn test_serialize_column() {
        let mut col = AttributeColumn::new("edep", AttributeKind::Double);
        col.append_double(1.5).unwrap();
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "edep", "kind": "double", "values": [1.5]})
        );
    }
}
