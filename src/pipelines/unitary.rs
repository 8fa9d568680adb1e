//! Statevector evolution and per-qubit RDM extraction (spec §4.4).

use crate::cancel::CancellationToken;
use crate::complex::C;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::ir::{Circuit, Instruction};
use crate::kernels;
use crate::math::Rdm;

use super::Pipeline;

pub struct UnitaryPipeline;

impl Pipeline for UnitaryPipeline {
    fn run(
        &self,
        circuit: &Circuit,
        _shots: u64,
        _cfg: &SimConfig,
        cancel: &CancellationToken,
    ) -> Result<Vec<Rdm>, SimError> {
        let n = circuit.num_qubits();
        let dim = 1usize
            .checked_shl(n as u32)
            .ok_or_else(|| SimError::Resource(format!("{n} qubits overflows a basis index")))?;

        log::info!("unitary pipeline: evolving {n}-qubit statevector over {} instructions", circuit.instructions().len());
        let mut state = vec![C::new(0.0, 0.0); dim];
        state[0] = C::new(1.0, 0.0);

        for instr in circuit.instructions() {
            if cancel.is_cancelled() {
                return Err(SimError::Cancelled);
            }
            log::debug!("applying {instr:?}");
            apply(&mut state, n, instr)?;
        }

        let rdms = (0..n).map(|q| kernels::rdm_from_statevector(&state, n, q)).collect();
        Ok(rdms)
    }
}

fn apply(state: &mut [C], n: usize, instr: &Instruction) -> Result<(), SimError> {
    match instr {
        Instruction::Unitary1 { matrix, qubit } => {
            kernels::apply_single(state, n, *qubit, matrix);
        }
        Instruction::Controlled1 { matrix, control, target } => {
            kernels::apply_controlled(state, n, *control, *target, matrix);
        }
        Instruction::Toffoli { control0, control1, target } => {
            kernels::apply_toffoli(state, n, *control0, *control1, *target);
        }
        Instruction::Swap { a, b } => {
            kernels::apply_swap(state, n, *a, *b);
        }
        Instruction::Barrier => {}
        // The router only ever hands the unitary pipeline a circuit for
        // which `Circuit::is_unitary()` held, so these are unreachable by
        // construction; guard anyway rather than silently dropping them.
        Instruction::Measure { .. } | Instruction::Reset { .. } => {
            return Err(SimError::internal("measure/reset reached the unitary pipeline"));
        }
    }
    Ok(())
}
