//! # hitrec
//!
//! Typed columnar hit recording for Monte Carlo particle transport.
//!
//! The transport engine hands every step (or finished event) to a worker's
//! [`HitsCollectionManager`]; each configured collection extracts its
//! attributes from the step and appends one row. Output collections can be
//! derived from others through an [`AttributeFiller`], and acceptance filters
//! decide which steps are recorded at all.
//!
//! ## Quick Start
//!
//! ```ignore
//! use hitrec::prelude::*;
//!
//! let config = RecorderConfig::from_toml_str(r#"
//!     [[collections]]
//!     name = "hits"
//!     attributes = ["TotalEnergyDeposit", "ParticleName"]
//! "#)?;
//!
//! let session = Session::builder().config(config).build()?;
//!
//! // On each worker thread
//! let mut worker = session.worker()?;
//! worker.process_step(&step)?;
//! session.submit(worker);
//!
//! // End of run
//! let hits = session.merged("hits")?;
//! let edep = hits.get_column("TotalEnergyDeposit")?.values_as_double()?;
//! ```
//!
//! ## Crates
//!
//! - `hitrec-core` - value kinds, columns, transport views, errors
//! - `hitrec-engine` - registry, collections, fillers, filters, manager

#![warn(missing_docs)]

mod config;
mod error;
mod session;

pub mod prelude;

// Re-export main entry points
pub use error::{Error, Result};
pub use session::{Session, SessionBuilder};

// Re-export configuration
pub use config::{CollectionConfig, FilterConfig, RecorderConfig};

// Re-export the recording subsystem
pub use hitrec_core::{
    AttributeColumn, AttributeKind, AttributeValue, ColumnValues, HitsError, HitsResult,
    StepView, ThreeVector, TrackView,
};
pub use hitrec_engine::{
    builtin, AcceptanceFilter, AttributeFiller, AttributeRegistry, CollectionId, CollectionSpec,
    FilterChain, Granularity, HitsCollection, HitsCollectionManager, KineticEnergyFilter,
    ParticleFilter,
};
