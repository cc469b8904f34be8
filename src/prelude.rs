//! Convenient imports for hitrec.
//!
//! ```ignore
//! use hitrec::prelude::*;
//!
//! let session = Session::builder().config(config).build()?;
//! let mut worker = session.worker()?;
//! ```

// Main entry point
pub use crate::session::{Session, SessionBuilder};

// Error handling
pub use crate::error::{Error, Result};

// Configuration
pub use crate::config::{CollectionConfig, FilterConfig, RecorderConfig};

// Value model and transport views
pub use hitrec_core::{
    AttributeColumn, AttributeKind, AttributeValue, HitsError, HitsResult, StepView, ThreeVector,
    TrackView,
};

// Recording engine
pub use hitrec_engine::{
    AcceptanceFilter, AttributeFiller, AttributeRegistry, CollectionSpec, FilterChain,
    Granularity, HitsCollection, HitsCollectionManager, KineticEnergyFilter, ParticleFilter,
};
