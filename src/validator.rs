//! Resource caps and circuit classification (spec §4.2).
//!
//! The gate whitelist itself is enforced structurally by the parser (an
//! unsupported gate name cannot be turned into an [`Instruction`], so it is
//! rejected there as a `ParseError` — spec §6.2, "any other token, gate, or
//! form is a parse error"). The validator re-asserts the whitelist as a
//! cheap, explicit invariant over the already-built IR (every `Instruction`
//! variant is, by construction, a whitelisted operation) and is where the
//! resource caps of §4.2 and the unitarity classification live, since both
//! need the fully assembled [`Circuit`] rather than a single statement.

use std::collections::HashMap;

use crate::config::SimConfig;
use crate::error::{CapKind, SimError};
use crate::ir::Circuit;

#[derive(Debug, Clone)]
pub struct CircuitInfo {
    pub num_qubits: usize,
    pub num_operations: usize,
    pub gate_histogram: HashMap<String, u32>,
    pub is_unitary: bool,
}

/// Validate `circuit` against `cfg`'s resource caps and classify it.
pub fn validate(
    circuit: &Circuit,
    gate_histogram: HashMap<String, u32>,
    cfg: &SimConfig,
) -> Result<CircuitInfo, SimError> {
    if circuit.num_qubits() == 0 || circuit.num_qubits() > cfg.max_qubits {
        return Err(SimError::validation(
            CapKind::MaxQubits,
            format!(
                "circuit uses {} qubits, cap is {}",
                circuit.num_qubits(),
                cfg.max_qubits
            ),
        ));
    }
    if circuit.instructions().len() > cfg.max_operations {
        return Err(SimError::validation(
            CapKind::MaxOperations,
            format!(
                "circuit has {} operations, cap is {}",
                circuit.instructions().len(),
                cfg.max_operations
            ),
        ));
    }

    log::info!(
        "validated circuit: {} qubits, {} operations, unitary={}",
        circuit.num_qubits(),
        circuit.instructions().len(),
        circuit.is_unitary()
    );

    Ok(CircuitInfo {
        num_qubits: circuit.num_qubits(),
        num_operations: circuit.instructions().len(),
        gate_histogram,
        is_unitary: circuit.is_unitary(),
    })
}

/// Validate a requested shot count against `cfg`'s bounds (spec §4.2,
/// `shots <= 100_000`; the trajectory pipeline separately clamps into
/// `[min_shots, max_shots]` per §6.1).
pub fn validate_shots(shots: u64, cfg: &SimConfig) -> Result<(), SimError> {
    if shots == 0 || shots > cfg.max_shots {
        return Err(SimError::validation(
            CapKind::MaxShots,
            format!("shots={shots} is outside the supported range 1..={}", cfg.max_shots),
        ));
    }
    Ok(())
}
