//! Pipeline selection (spec §4.3).

use crate::config::SimConfig;
use crate::error::SimError;
use crate::validator::CircuitInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    Unitary,
    ExactDensity,
    Trajectory,
}

/// Choose a pipeline for `info` under `cfg`'s caps, honoring `override_` if
/// present and legal (spec §4.3). `shots` is only consulted to decide
/// whether an override is legal; routing for non-unitary circuits does not
/// itself depend on the shot count.
pub fn route(
    info: &CircuitInfo,
    override_: Option<PipelineKind>,
    cfg: &SimConfig,
) -> Result<PipelineKind, SimError> {
    if let Some(kind) = override_ {
        check_override_legal(info, kind, cfg)?;
        log::info!("pipeline override accepted: {kind:?}");
        return Ok(kind);
    }

    let chosen = if info.is_unitary {
        if info.num_qubits <= cfg.unitary_qubit_limit {
            PipelineKind::Unitary
        } else {
            return Err(SimError::Router(format!(
                "unitary circuit with {} qubits exceeds the unitary pipeline's {}-qubit budget",
                info.num_qubits, cfg.unitary_qubit_limit
            )));
        }
    } else if info.num_qubits <= cfg.exact_density_qubit_limit {
        PipelineKind::ExactDensity
    } else {
        if info.num_qubits > 16 {
            log::warn!(
                "routing a {}-qubit non-unitary circuit to the trajectory pipeline best-effort \
                 (exceeds the 16-qubit comfort zone of spec §4.3)",
                info.num_qubits
            );
        }
        PipelineKind::Trajectory
    };

    log::info!("router selected {chosen:?} for {} qubits (unitary={})", info.num_qubits, info.is_unitary);
    Ok(chosen)
}

fn check_override_legal(
    info: &CircuitInfo,
    kind: PipelineKind,
    cfg: &SimConfig,
) -> Result<(), SimError> {
    match kind {
        PipelineKind::Unitary => {
            if !info.is_unitary {
                return Err(SimError::Router(
                    "cannot force the unitary pipeline on a circuit containing measure/reset".into(),
                ));
            }
            if info.num_qubits > cfg.unitary_qubit_limit {
                return Err(SimError::Router(format!(
                    "cannot force the unitary pipeline: {} qubits exceeds the {}-qubit cap",
                    info.num_qubits, cfg.unitary_qubit_limit
                )));
            }
        }
        PipelineKind::ExactDensity => {
            if info.num_qubits > cfg.exact_density_qubit_limit {
                return Err(SimError::Router(format!(
                    "cannot force exact_density: {} qubits exceeds the {}-qubit cap",
                    info.num_qubits, cfg.exact_density_qubit_limit
                )));
            }
        }
        PipelineKind::Trajectory => {
            if info.num_qubits > cfg.max_qubits {
                return Err(SimError::Router(format!(
                    "cannot force trajectory: {} qubits exceeds the {}-qubit cap",
                    info.num_qubits, cfg.max_qubits
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn info(num_qubits: usize, is_unitary: bool) -> CircuitInfo {
        CircuitInfo { num_qubits, num_operations: 0, gate_histogram: HashMap::new(), is_unitary }
    }

    #[test]
    fn unitary_circuit_routes_to_unitary_pipeline() {
        let cfg = SimConfig::default();
        assert_eq!(route(&info(5, true), None, &cfg).unwrap(), PipelineKind::Unitary);
    }

    #[test]
    fn large_unitary_circuit_is_rejected() {
        let cfg = SimConfig::default();
        assert!(route(&info(21, true), None, &cfg).is_err());
    }

    #[test]
    fn small_non_unitary_routes_to_exact_density() {
        let cfg = SimConfig::default();
        assert_eq!(route(&info(8, false), None, &cfg).unwrap(), PipelineKind::ExactDensity);
    }

    #[test]
    fn medium_non_unitary_routes_to_trajectory() {
        let cfg = SimConfig::default();
        assert_eq!(route(&info(12, false), None, &cfg).unwrap(), PipelineKind::Trajectory);
    }

    #[test]
    fn large_non_unitary_still_routes_to_trajectory() {
        let cfg = SimConfig::default();
        assert_eq!(route(&info(20, false), None, &cfg).unwrap(), PipelineKind::Trajectory);
    }

    #[test]
    fn override_conflicting_with_circuit_kind_is_rejected() {
        let cfg = SimConfig::default();
        assert!(route(&info(3, false), Some(PipelineKind::Unitary), &cfg).is_err());
    }

    #[test]
    fn override_exceeding_cap_is_rejected() {
        let cfg = SimConfig::default();
        assert!(route(&info(10, false), Some(PipelineKind::ExactDensity), &cfg).is_err());
    }

    #[test]
    fn trajectory_override_exceeding_max_qubits_is_a_router_error() {
        let cfg = SimConfig { max_qubits: 4, ..SimConfig::default() };
        let err = route(&info(10, false), Some(PipelineKind::Trajectory), &cfg).unwrap_err();
        assert!(matches!(err, SimError::Router(_)));
    }
}
