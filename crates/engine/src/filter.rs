//! Acceptance filters
//!
//! A filter decides, before recording, whether a track or step contributes a
//! row at all. Filters are validated at construction and hold no mutable
//! state afterwards, so one filter can serve every worker thread.

use hitrec_core::{HitsError, HitsResult, StepView, TrackView};
use std::fmt;

/// Predicate over tracks and steps
pub trait AcceptanceFilter: Send + Sync + fmt::Debug {
    /// Decide for a track
    fn accept_track(&self, track: &dyn TrackView) -> bool;

    /// Decide for a step; defaults to deciding on the step's track
    fn accept_step(&self, step: &dyn StepView) -> bool {
        self.accept_track(step.track())
    }
}

/// Accepts tracks of exactly one particle species
///
/// Exact, case-sensitive match: a filter for `"gamma"` rejects `"Gamma"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticleFilter {
    particle: String,
}

impl ParticleFilter {
    /// Create a filter for `particle`
    ///
    /// # Errors
    /// - `Configuration` if `particle` is empty
    pub fn new(particle: impl Into<String>) -> HitsResult<Self> {
        let particle = particle.into();
        if particle.is_empty() {
            return Err(HitsError::configuration(
                "particle filter requires a non-empty particle name",
            ));
        }
        Ok(Self { particle })
    }

    /// The configured particle name
    pub fn particle(&self) -> &str {
        &self.particle
    }
}

impl AcceptanceFilter for ParticleFilter {
    fn accept_track(&self, track: &dyn TrackView) -> bool {
        track.particle_name() == Some(self.particle.as_str())
    }
}

/// Accepts tracks whose kinetic energy lies in `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KineticEnergyFilter {
    min: f64,
    max: f64,
}

impl KineticEnergyFilter {
    /// Create a filter for the inclusive range `[min, max]`
    ///
    /// # Errors
    /// - `Configuration` if a bound is NaN or `min > max`
    pub fn new(min: f64, max: f64) -> HitsResult<Self> {
        if min.is_nan() || max.is_nan() {
            return Err(HitsError::configuration(
                "kinetic energy filter bounds must not be NaN",
            ));
        }
        if min > max {
            return Err(HitsError::configuration(format!(
                "kinetic energy filter range is empty: min {} > max {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// Filter with only a lower bound
    pub fn at_least(min: f64) -> HitsResult<Self> {
        Self::new(min, f64::INFINITY)
    }

    /// Lower bound
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl AcceptanceFilter for KineticEnergyFilter {
    fn accept_track(&self, track: &dyn TrackView) -> bool {
        track
            .kinetic_energy()
            .is_some_and(|e| e >= self.min && e <= self.max)
    }
}

/// Accepts only what every member filter accepts
#[derive(Debug)]
pub struct FilterChain {
    filters: Vec<Box<dyn AcceptanceFilter>>,
}

impl FilterChain {
    /// Combine `filters`
    ///
    /// # Errors
    /// - `Configuration` if `filters` is empty
    pub fn new(filters: Vec<Box<dyn AcceptanceFilter>>) -> HitsResult<Self> {
        if filters.is_empty() {
            return Err(HitsError::configuration("filter chain has no filters"));
        }
        Ok(Self { filters })
    }

    /// Number of member filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Always false; an empty chain cannot be built
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl AcceptanceFilter for FilterChain {
    fn accept_track(&self, track: &dyn TrackView) -> bool {
        self.filters.iter().all(|f| f.accept_track(track))
    }

    fn accept_step(&self, step: &dyn StepView) -> bool {
        self.filters.iter().all(|f| f.accept_step(step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Track {
        particle: Option<&'static str>,
        energy: Option<f64>,
    }

    impl TrackView for Track {
        fn particle_name(&self) -> Option<&str> {
            self.particle
        }

        fn kinetic_energy(&self) -> Option<f64> {
            self.energy
        }
    }

    struct Step {
        track: Track,
    }

    impl StepView for Step {
        fn track(&self) -> &dyn TrackView {
            &self.track
        }
    }

    fn track(particle: &'static str, energy: f64) -> Track {
        Track {
            particle: Some(particle),
            energy: Some(energy),
        }
    }

    mod particle_filter_tests {
        use super::*;

        #[test]
        fn test_exact_match_only() {
            let filter = ParticleFilter::new("gamma").unwrap();
            assert!(filter.accept_track(&track("gamma", 1.0)));
            assert!(!filter.accept_track(&track("e-", 1.0)));
            assert!(!filter.accept_track(&track("", 1.0)));
            assert!(!filter.accept_track(&track("Gamma", 1.0)));
        }

        #[test]
        fn test_step_uses_track() {
            let filter = ParticleFilter::new("gamma").unwrap();
            assert!(filter.accept_step(&Step {
                track: track("gamma", 1.0)
            }));
            assert!(!filter.accept_step(&Step {
                track: track("e+", 1.0)
            }));
        }

        #[test]
        fn test_unnamed_track_rejected() {
            let filter = ParticleFilter::new("gamma").unwrap();
            let anonymous = Track {
                particle: None,
                energy: None,
            };
            assert!(!filter.accept_track(&anonymous));
        }

        #[test]
        fn test_empty_name_is_configuration_error() {
            assert!(matches!(
                ParticleFilter::new(""),
                Err(HitsError::Configuration { .. })
            ));
        }
    }

    mod energy_filter_tests {
        use super::*;

        #[test]
        fn test_inclusive_bounds() {
            let filter = KineticEnergyFilter::new(1.0, 2.0).unwrap();
            assert!(filter.accept_track(&track("e-", 1.0)));
            assert!(filter.accept_track(&track("e-", 2.0)));
            assert!(!filter.accept_track(&track("e-", 0.999)));
            assert!(!filter.accept_track(&track("e-", 2.001)));
        }

        #[test]
        fn test_missing_energy_rejected() {
            let filter = KineticEnergyFilter::at_least(0.0).unwrap();
            let t = Track {
                particle: Some("e-"),
                energy: None,
            };
            assert!(!filter.accept_track(&t));
        }

        #[test]
        fn test_invalid_ranges() {
            assert!(KineticEnergyFilter::new(2.0, 1.0).is_err());
            assert!(KineticEnergyFilter::new(f64::NAN, 1.0).is_err());
            assert!(KineticEnergyFilter::new(0.0, f64::NAN).is_err());
        }
    }

    mod chain_tests {
        use super::*;

        #[test]
        fn test_all_must_accept() {
            let chain = FilterChain::new(vec![
                Box::new(ParticleFilter::new("gamma").unwrap()),
                Box::new(KineticEnergyFilter::at_least(0.1).unwrap()),
            ])
            .unwrap();
            assert_eq!(chain.len(), 2);
            assert!(chain.accept_track(&track("gamma", 0.5)));
            assert!(!chain.accept_track(&track("gamma", 0.05)));
            assert!(!chain.accept_step(&Step {
                track: track("e-", 0.5)
            }));
        }

        #[test]
        fn test_empty_chain_rejected() {
            assert!(matches!(
                FilterChain::new(Vec::new()),
                Err(HitsError::Configuration { .. })
            ));
        }
    }
}
