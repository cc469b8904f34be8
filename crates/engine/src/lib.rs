//! Hit recording engine
//!
//! This crate turns transport steps into rows of typed columns:
//! - [`AttributeRegistry`]: name -> (kind, extractor), shared read-only by workers
//! - [`HitsCollection`]: ordered set of columns filled one full row at a time
//! - [`AttributeFiller`]: copies selected columns row by row between collections
//! - [`AcceptanceFilter`]: predicates deciding whether a step is recorded at all
//! - [`HitsCollectionManager`]: the per-worker set of collections and their wiring

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builtin;
pub mod collection;
pub mod filler;
pub mod filter;
pub mod manager;
pub mod registry;

pub use collection::{CollectionId, Granularity, HitsCollection};
pub use filler::AttributeFiller;
pub use filter::{AcceptanceFilter, FilterChain, KineticEnergyFilter, ParticleFilter};
pub use manager::{CollectionSpec, HitsCollectionManager};
pub use registry::{AttributeRegistry, Extractor};
