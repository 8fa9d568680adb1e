//! The three simulation engines behind one shared contract (spec §4.4-4.6,
//! §9 "model the three pipelines as variants of a sum type with a shared
//! method signature").

pub mod exact_density;
pub mod trajectory;
pub mod unitary;

use crate::cancel::CancellationToken;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::ir::Circuit;
use crate::math::Rdm;
use crate::router::PipelineKind;

/// Shared entry point every pipeline implements. Returns one RDM per qubit,
/// in qubit-index order, or an error with no partial state surfaced.
pub trait Pipeline {
    fn run(
        &self,
        circuit: &Circuit,
        shots: u64,
        cfg: &SimConfig,
        cancel: &CancellationToken,
    ) -> Result<Vec<Rdm>, SimError>;
}

/// Dispatch to the chosen pipeline. A closed enum rather than a trait
/// object or class hierarchy, per spec §9 — the set of pipelines is fixed.
pub fn run(
    kind: PipelineKind,
    circuit: &Circuit,
    shots: u64,
    seed: Option<u64>,
    cfg: &SimConfig,
    cancel: &CancellationToken,
) -> Result<Vec<Rdm>, SimError> {
    match kind {
        PipelineKind::Unitary => unitary::UnitaryPipeline.run(circuit, shots, cfg, cancel),
        PipelineKind::ExactDensity => exact_density::ExactDensityPipeline.run(circuit, shots, cfg, cancel),
        PipelineKind::Trajectory => {
            trajectory::TrajectoryPipeline { seed }.run(circuit, shots, cfg, cancel)
        }
    }
}
