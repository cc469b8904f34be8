//! Value types for hit recording
//!
//! A recorded attribute is always one of four kinds. The kind of a column is
//! fixed when the column is created; values of any other kind are rejected.
//!
//! ## Equality Rules
//!
//! - Different kinds are NEVER equal (`Int(1)` != `Double(1.0)`)
//! - Double uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of value an attribute produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// 64-bit IEEE-754 floating point
    Double,
    /// 64-bit signed integer
    Int,
    /// UTF-8 string
    String,
    /// Cartesian 3-vector of doubles
    Vector3,
}

impl AttributeKind {
    /// All kinds, in declaration order
    pub const ALL: [AttributeKind; 4] = [
        AttributeKind::Double,
        AttributeKind::Int,
        AttributeKind::String,
        AttributeKind::Vector3,
    ];

    /// Human-readable name for display and error messages
    pub fn name(&self) -> &'static str {
        match self {
            AttributeKind::Double => "double",
            AttributeKind::Int => "int",
            AttributeKind::String => "string",
            AttributeKind::Vector3 => "vector3",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "double" | "d" | "f64" => Some(AttributeKind::Double),
            "int" | "i" | "i64" => Some(AttributeKind::Int),
            "string" | "s" | "str" => Some(AttributeKind::String),
            "vector3" | "3" | "threevector" => Some(AttributeKind::Vector3),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cartesian 3-vector (positions, directions, momenta)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreeVector {
    /// x component
    pub x: f64,
    /// y component
    pub y: f64,
    /// z component
    pub z: f64,
}

impl ThreeVector {
    /// Create a vector from its components
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm
    pub fn mag(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl From<[f64; 3]> for ThreeVector {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// One recorded value
///
/// This is the unit moved between extractors, columns and fillers. Columns
/// store values unboxed; `AttributeValue` only exists in transit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Real number
    Double(f64),
    /// Integer
    Int(i64),
    /// String
    String(String),
    /// 3-vector
    Vector3(ThreeVector),
}

impl AttributeValue {
    /// The kind of this value
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Double(_) => AttributeKind::Double,
            AttributeValue::Int(_) => AttributeKind::Int,
            AttributeValue::String(_) => AttributeKind::String,
            AttributeValue::Vector3(_) => AttributeKind::Vector3,
        }
    }

    /// Try to get as f64
    pub fn as_double(&self) -> Option<f64> {
        match self {
            AttributeValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as 3-vector
    pub fn as_vector3(&self) -> Option<ThreeVector> {
        match self {
            AttributeValue::Vector3(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(d: f64) -> Self {
        AttributeValue::Double(d)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Int(i)
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<ThreeVector> for AttributeValue {
    fn from(v: ThreeVector) -> Self {
        AttributeValue::Vector3(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod kind_tests {
        use super::*;

        #[test]
        fn test_kind_names_unique() {
            let mut names: Vec<_> = AttributeKind::ALL.iter().map(|k| k.name()).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), AttributeKind::ALL.len());
        }

        #[test]
        fn test_kind_parse_round_trips_name() {
            for kind in AttributeKind::ALL {
                assert_eq!(AttributeKind::parse(kind.name()), Some(kind));
            }
        }

        #[test]
        fn test_kind_parse_case_insensitive() {
            assert_eq!(AttributeKind::parse("DOUBLE"), Some(AttributeKind::Double));
            assert_eq!(AttributeKind::parse("Vector3"), Some(AttributeKind::Vector3));
            assert_eq!(AttributeKind::parse("quaternion"), None);
        }

        #[test]
        fn test_kind_serde_snake_case() {
            let json = serde_json::to_string(&AttributeKind::Vector3).unwrap();
            assert_eq!(json, r#""vector3""#);
            let back: AttributeKind = serde_json::from_str(r#""int""#).unwrap();
            assert_eq!(back, AttributeKind::Int);
        }
    }

    mod value_tests {
        use super::*;

        #[test]
        fn test_value_kind_matches_variant() {
            assert_eq!(AttributeValue::from(1.5).kind(), AttributeKind::Double);
            assert_eq!(AttributeValue::from(7i64).kind(), AttributeKind::Int);
            assert_eq!(AttributeValue::from("gamma").kind(), AttributeKind::String);
            assert_eq!(
                AttributeValue::from(ThreeVector::new(1.0, 2.0, 3.0)).kind(),
                AttributeKind::Vector3
            );
        }

        #[test]
        fn test_no_cross_kind_equality() {
            assert_ne!(AttributeValue::Int(1), AttributeValue::Double(1.0));
        }

        #[test]
        fn test_accessors_reject_other_kinds() {
            let v = AttributeValue::Double(2.0);
            assert_eq!(v.as_double(), Some(2.0));
            assert_eq!(v.as_int(), None);
            assert_eq!(v.as_str(), None);
            assert_eq!(v.as_vector3(), None);
        }

        #[test]
        fn test_nan_not_equal() {
            assert_ne!(AttributeValue::Double(f64::NAN), AttributeValue::Double(f64::NAN));
        }
    }

    #[test]
    fn test_three_vector_mag() {
        let v = ThreeVector::from([3.0, 4.0, 0.0]);
        assert!((v.mag() - 5.0).abs() < f64::EPSILON);
    }
}
