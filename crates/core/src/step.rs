//! Read-only views of the transport engine state
//!
//! The transport engine owns tracks and steps; this subsystem only reads them.
//! Every accessor returns `Option` so a view can report data it does not carry
//! (e.g. no volume outside the world). The defaults return `None`, which lets a
//! driver implement only what it actually supplies.

use crate::value::ThreeVector;

/// State of a single particle as it moves through the geometry
pub trait TrackView {
    /// Particle species name (e.g. "gamma", "e-")
    fn particle_name(&self) -> Option<&str>;

    /// Kinetic energy at the current point
    fn kinetic_energy(&self) -> Option<f64> {
        None
    }

    /// Track identifier within the event
    fn track_id(&self) -> Option<i64> {
        None
    }

    /// Identifier of the parent track (0 for primaries)
    fn parent_id(&self) -> Option<i64> {
        None
    }

    /// Statistical weight of the track
    fn weight(&self) -> Option<f64> {
        None
    }

    /// Current momentum direction (unit vector)
    fn momentum_direction(&self) -> Option<ThreeVector> {
        None
    }
}

/// One discrete segment of a track between two interactions
pub trait StepView {
    /// The track this step belongs to
    fn track(&self) -> &dyn TrackView;

    /// Energy deposited along the step
    fn total_energy_deposit(&self) -> Option<f64> {
        None
    }

    /// Position at the start of the step
    fn pre_position(&self) -> Option<ThreeVector> {
        None
    }

    /// Position at the end of the step
    fn post_position(&self) -> Option<ThreeVector> {
        None
    }

    /// Time since the start of the event
    fn global_time(&self) -> Option<f64> {
        None
    }

    /// Time since the creation of the track
    fn local_time(&self) -> Option<f64> {
        None
    }

    /// Name of the volume the step starts in
    fn volume_name(&self) -> Option<&str> {
        None
    }

    /// Process that limited the step
    fn process_name(&self) -> Option<&str> {
        None
    }

    /// Event identifier
    fn event_id(&self) -> Option<i64> {
        None
    }

    /// Run identifier
    fn run_id(&self) -> Option<i64> {
        None
    }

    /// Worker thread identifier
    fn thread_id(&self) -> Option<i64> {
        None
    }
}
