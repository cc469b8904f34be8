//! Built-in step attributes
//!
//! The standard quantities every transport step can offer. Names follow the
//! conventions users already write in their output configuration
//! (`TotalEnergyDeposit`, `PostPosition`, ...).

use crate::registry::AttributeRegistry;
use hitrec_core::{AttributeKind, AttributeValue, HitsError, HitsResult, StepView};
use std::sync::Arc;
use tracing::debug;

/// Every built-in attribute with its kind
pub const BUILTIN_ATTRIBUTES: &[(&str, AttributeKind)] = &[
    ("TotalEnergyDeposit", AttributeKind::Double),
    ("KineticEnergy", AttributeKind::Double),
    ("Weight", AttributeKind::Double),
    ("GlobalTime", AttributeKind::Double),
    ("LocalTime", AttributeKind::Double),
    ("TrackID", AttributeKind::Int),
    ("ParentID", AttributeKind::Int),
    ("EventID", AttributeKind::Int),
    ("RunID", AttributeKind::Int),
    ("ThreadID", AttributeKind::Int),
    ("ParticleName", AttributeKind::String),
    ("VolumeName", AttributeKind::String),
    ("ProcessDefinedStep", AttributeKind::String),
    ("PrePosition", AttributeKind::Vector3),
    ("PostPosition", AttributeKind::Vector3),
    ("MomentumDirection", AttributeKind::Vector3),
];

fn read<T>(name: &str, value: Option<T>) -> HitsResult<T> {
    value.ok_or_else(|| HitsError::extraction(name, "not available at this step"))
}

fn extract_builtin(name: &'static str, step: &dyn StepView) -> HitsResult<AttributeValue> {
    let track = step.track();
    let value: AttributeValue = match name {
        "TotalEnergyDeposit" => read(name, step.total_energy_deposit())?.into(),
        "KineticEnergy" => read(name, track.kinetic_energy())?.into(),
        "Weight" => read(name, track.weight())?.into(),
        "GlobalTime" => read(name, step.global_time())?.into(),
        "LocalTime" => read(name, step.local_time())?.into(),
        "TrackID" => read(name, track.track_id())?.into(),
        "ParentID" => read(name, track.parent_id())?.into(),
        "EventID" => read(name, step.event_id())?.into(),
        "RunID" => read(name, step.run_id())?.into(),
        "ThreadID" => read(name, step.thread_id())?.into(),
        "ParticleName" => read(name, track.particle_name())?.into(),
        "VolumeName" => read(name, step.volume_name())?.into(),
        "ProcessDefinedStep" => read(name, step.process_name())?.into(),
        "PrePosition" => read(name, step.pre_position())?.into(),
        "PostPosition" => read(name, step.post_position())?.into(),
        "MomentumDirection" => read(name, track.momentum_direction())?.into(),
        _ => return Err(HitsError::unknown_attribute(name)),
    };
    Ok(value)
}

/// Register every built-in attribute into `registry`
///
/// A name that is already registered keeps its existing definition, whatever
/// its kind, so user attributes registered first always win.
pub fn register_builtins(registry: &mut AttributeRegistry) {
    for &(name, kind) in BUILTIN_ATTRIBUTES {
        if let Ok(existing) = registry.kind_of(name) {
            if existing != kind {
                debug!(attribute = name, kind = %existing, "built-in shadowed by user definition");
            }
            continue;
        }
        registry.insert(
            name,
            kind,
            Arc::new(move |step: &dyn StepView| extract_builtin(name, step)),
        );
    }
}
