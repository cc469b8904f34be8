//! Recorder configuration.
//!
//! Describes which collections each worker records, what attributes they
//! hold, and how they are filtered. Usually loaded from TOML:
//!
//! ```toml
//! [[collections]]
//! name = "hits"
//! attributes = ["TotalEnergyDeposit", "ParticleName", "PostPosition"]
//!
//! [[collections]]
//! name = "gamma_hits"
//! attributes = ["TotalEnergyDeposit"]
//! source = "hits"
//! filter = { kind = "particle", name = "gamma" }
//!
//! [[collections]]
//! name = "events"
//! attributes = ["EventID", "TotalEnergyDeposit"]
//! granularity = "event"
//! ```

use crate::error::{Error, Result};
use hitrec_core::HitsError;
use hitrec_engine::{
    AcceptanceFilter, CollectionSpec, FilterChain, Granularity, KineticEnergyFilter,
    ParticleFilter,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

fn unbounded() -> f64 {
    f64::INFINITY
}

/// Acceptance filter declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterConfig {
    /// Exact particle-name match
    Particle {
        /// Expected particle name; required
        #[serde(default)]
        name: Option<String>,
    },
    /// Inclusive kinetic energy window
    KineticEnergy {
        /// Lower bound (default 0)
        #[serde(default)]
        min: f64,
        /// Upper bound (default unbounded)
        #[serde(default = "unbounded")]
        max: f64,
    },
    /// Every member filter must accept
    All {
        /// Member filters
        filters: Vec<FilterConfig>,
    },
}

impl FilterConfig {
    /// Build the filter
    ///
    /// # Errors
    /// - `Configuration` for a missing or empty particle name, an invalid
    ///   energy window, or an empty `all` list
    pub fn build(&self) -> Result<Arc<dyn AcceptanceFilter>> {
        Ok(Arc::from(self.build_boxed()?))
    }

    fn build_boxed(&self) -> Result<Box<dyn AcceptanceFilter>> {
        let filter: Box<dyn AcceptanceFilter> = match self {
            FilterConfig::Particle { name } => {
                let name = name.as_deref().ok_or_else(|| {
                    HitsError::configuration("particle filter has no particle name")
                })?;
                Box::new(ParticleFilter::new(name)?)
            }
            FilterConfig::KineticEnergy { min, max } => {
                Box::new(KineticEnergyFilter::new(*min, *max)?)
            }
            FilterConfig::All { filters } => {
                let members = filters
                    .iter()
                    .map(FilterConfig::build_boxed)
                    .collect::<Result<Vec<_>>>()?;
                Box::new(FilterChain::new(members)?)
            }
        };
        Ok(filter)
    }
}

/// One collection declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Collection name, unique in the config
    pub name: String,
    /// Attributes, in column order
    pub attributes: Vec<String>,
    /// Step- or event-level recording
    #[serde(default)]
    pub granularity: Granularity,
    /// Optional acceptance filter
    #[serde(default)]
    pub filter: Option<FilterConfig>,
    /// Source collection for derived collections
    #[serde(default)]
    pub source: Option<String>,
}

impl CollectionConfig {
    /// Convert to an engine collection spec, building the filter
    pub fn to_spec(&self) -> Result<CollectionSpec> {
        let mut spec = CollectionSpec::new(self.name.clone(), self.attributes.as_slice())
            .granularity(self.granularity);
        if let Some(filter) = &self.filter {
            spec = spec.filter(filter.build()?);
        }
        if let Some(source) = &self.source {
            spec = spec.derived_from(source.clone());
        }
        Ok(spec)
    }
}

/// Full recorder configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Collections, in declaration order
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,
}

impl RecorderConfig {
    /// Parse from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check collection wiring
    ///
    /// Attribute names are checked later, against the registry.
    ///
    /// # Errors
    /// - `Configuration` for an empty config, duplicate names, or a derived
    ///   collection whose source is unknown, declared later, itself derived,
    ///   or of another granularity
    pub fn validate(&self) -> Result<()> {
        if self.collections.is_empty() {
            return Err(Error::Configuration("no collections configured".into()));
        }

        let mut declared: FxHashMap<&str, &CollectionConfig> = FxHashMap::default();
        for c in &self.collections {
            if let Some(source) = &c.source {
                let src = declared.get(source.as_str()).ok_or_else(|| {
                    Error::Configuration(format!(
                        "collection '{}' derives from '{}', which is not declared before it",
                        c.name, source
                    ))
                })?;
                if src.source.is_some() {
                    return Err(Error::Configuration(format!(
                        "collection '{}' derives from '{}', which is itself derived",
                        c.name, source
                    )));
                }
                if src.granularity != c.granularity {
                    return Err(Error::Configuration(format!(
                        "collection '{}' and its source '{}' differ in granularity",
                        c.name, source
                    )));
                }
            }
            if declared.insert(c.name.as_str(), c).is_some() {
                return Err(Error::Configuration(format!(
                    "collection '{}' declared twice",
                    c.name
                )));
            }
        }
        Ok(())
    }

    /// Engine specs for every collection, in declaration order
    pub fn to_specs(&self) -> Result<Vec<CollectionSpec>> {
        self.collections.iter().map(CollectionConfig::to_spec).collect()
    }
}
