//! Post-run invariant validation and response assembly (spec §4.8).
//!
//! This is the only module that converts the internal `Complex64` scalar
//! type to the wire's `[re, im]` pairs (spec §9, "duck-typed complex
//! matrices on the wire... the wire conversion happens only in the result
//! assembler").

use crate::api::{CircuitInfoReport, QubitReport, SimulationResponse, WireComplex};
use crate::error::SimError;
use crate::math::{self, Rdm};
use crate::router::PipelineKind;
use crate::validator::CircuitInfo;

/// Validate the universal invariants of spec §4.8/§8(1-3) for one qubit's
/// RDM. `rho` is assumed already hermitized/normalized/clipped by
/// [`math::postprocess_rdm`].
fn check_invariants(qubit: usize, rho: &Rdm) -> Result<(), SimError> {
    let trace = rho.trace().re;
    if (trace - 1.0).abs() > 1e-6 {
        return Err(SimError::Numerical(format!(
            "qubit {qubit}: trace {trace} deviates from 1 by more than 1e-6"
        )));
    }

    let off_diag_asym = (rho[(0, 1)] - rho[(1, 0)].conj()).norm();
    if off_diag_asym > 1e-9 {
        return Err(SimError::Numerical(format!(
            "qubit {qubit}: rho is not Hermitian within 1e-9 (off-diagonal asymmetry {off_diag_asym})"
        )));
    }

    let det = rho[(0, 0)] * rho[(1, 1)] - rho[(0, 1)] * rho[(1, 0)];
    if rho[(0, 0)].re < -1e-9 || rho[(1, 1)].re < -1e-9 || det.re < -1e-9 {
        return Err(SimError::Numerical(format!(
            "qubit {qubit}: rho has a negative eigenvalue beyond tolerance (det={det:?})"
        )));
    }

    Ok(())
}

fn to_wire(z: crate::complex::C) -> WireComplex {
    [z.re, z.im]
}

/// Post-validate every per-qubit RDM and assemble the response (spec §4.8).
pub fn assemble(
    raw_rdms: Vec<Rdm>,
    pipeline_used: PipelineKind,
    execution_time_seconds: f64,
    shots_used: u64,
    info: &CircuitInfo,
) -> Result<SimulationResponse, SimError> {
    let mut qubits = Vec::with_capacity(raw_rdms.len());
    for (id, raw) in raw_rdms.into_iter().enumerate() {
        let rho = math::postprocess_rdm(&raw);
        check_invariants(id, &rho)?;

        let bloch_coords = math::clamp_bloch(math::bloch(&rho));
        let purity = math::purity(&rho).clamp(0.0, 1.0);

        qubits.push(QubitReport {
            id,
            label: format!("q[{id}]"),
            bloch_coords,
            purity,
            density_matrix: [
                [to_wire(rho[(0, 0)]), to_wire(rho[(0, 1)])],
                [to_wire(rho[(1, 0)]), to_wire(rho[(1, 1)])],
            ],
        });
    }

    Ok(SimulationResponse {
        qubits,
        pipeline_used,
        execution_time_seconds,
        shots_used,
        circuit_info: CircuitInfoReport {
            num_qubits: info.num_qubits,
            num_operations: info.num_operations,
            is_unitary: info.is_unitary,
            gate_histogram: info.gate_histogram.clone(),
        },
    })
}
