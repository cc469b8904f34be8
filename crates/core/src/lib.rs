//! Core types for hit recording
//!
//! This crate defines the building blocks shared by every layer:
//! - [`AttributeKind`] / [`AttributeValue`]: the four recordable value kinds
//! - [`AttributeColumn`]: one named, typed, append-only column
//! - [`TrackView`] / [`StepView`]: read-only views of the transport engine state
//! - [`HitsError`]: the error taxonomy for the subsystem

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod column;
pub mod error;
pub mod step;
pub mod value;

pub use column::{AttributeColumn, ColumnValues};
pub use error::{HitsError, HitsResult};
pub use step::{StepView, TrackView};
pub use value::{AttributeKind, AttributeValue, ThreeVector};
