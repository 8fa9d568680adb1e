//! Monte Carlo trajectory simulation (spec §4.6).
//!
//! Each shot is an independent pure-state evolution with projective
//! collapse at every `measure`/`reset`, run on its own `SmallRng` substream
//! (`crate::rng::trajectory_rng`) so shots are reproducible under a fixed
//! seed without a shared counter behind a lock. Shots run across a `rayon`
//! pool capped at `SimConfig::worker_pool_cap`, but the per-qubit average is
//! folded afterward in a fixed, shot-index order rather than via rayon's
//! own (scheduler-dependent) fold/reduce tree: `into_par_iter().map(...)`
//! is collected into a `Vec` indexed by shot, and rayon's indexed collect
//! always places each shot's result at its own index regardless of which
//! worker computed it or in what order workers finished. The subsequent sum
//! then walks that `Vec` sequentially, so the floating-point summation
//! order — and hence the exact bits of the averaged RDM — depends only on
//! the seed, never on thread scheduling (spec §8 property 8's "bitwise
//! identical" requirement is stricter than §5's "does not depend on
//! completion order").

use rand::rngs::SmallRng;
use rand::Rng;
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::complex::C;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::gate;
use crate::ir::{Circuit, Instruction};
use crate::kernels;
use crate::math::Rdm;
use crate::rng;

use super::Pipeline;

pub struct TrajectoryPipeline {
    pub seed: Option<u64>,
}

impl Pipeline for TrajectoryPipeline {
    fn run(
        &self,
        circuit: &Circuit,
        shots: u64,
        cfg: &SimConfig,
        cancel: &CancellationToken,
    ) -> Result<Vec<Rdm>, SimError> {
        let n = circuit.num_qubits();
        let shots = shots.clamp(cfg.min_shots, cfg.max_shots);
        let master_seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
        log::info!(
            "trajectory pipeline: {shots} shots over {n} qubits, {} instructions, master_seed={master_seed}",
            circuit.instructions().len()
        );

        let pool_size = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1)
            .min(cfg.worker_pool_cap);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(pool_size)
            .build()
            .map_err(|e| SimError::internal(format!("failed to build trajectory thread pool: {e}")))?;

        // Indexed collect: each shot's result lands at its own index no
        // matter which worker computed it, so the fold below sums in shot
        // order regardless of scheduling.
        let per_shot: Vec<Option<Vec<Rdm>>> = pool.install(|| {
            (0..shots)
                .into_par_iter()
                .map(|i| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let mut rng = rng::trajectory_rng(master_seed, i);
                    Some(simulate_trajectory(circuit, n, &mut rng))
                })
                .collect()
        });

        let mut sums = vec![Rdm::zeros(); n];
        for traj in per_shot {
            let traj = traj.ok_or(SimError::Cancelled)?;
            for (a, r) in sums.iter_mut().zip(traj.iter()) {
                *a += r;
            }
        }

        let divisor = C::new(shots as f64, 0.0);
        Ok(sums.into_iter().map(|s| s / divisor).collect())
    }
}

#[inline]
fn bit(b: usize, i: usize) -> usize {
    (b >> i) & 1
}

fn simulate_trajectory(circuit: &Circuit, n: usize, rng: &mut SmallRng) -> Vec<Rdm> {
    let dim = 1usize << n;
    let mut state = vec![C::new(0.0, 0.0); dim];
    state[0] = C::new(1.0, 0.0);

    for instr in circuit.instructions() {
        match instr {
            Instruction::Unitary1 { matrix, qubit } => {
                kernels::apply_single(&mut state, n, *qubit, matrix);
            }
            Instruction::Controlled1 { matrix, control, target } => {
                kernels::apply_controlled(&mut state, n, *control, *target, matrix);
            }
            Instruction::Toffoli { control0, control1, target } => {
                kernels::apply_toffoli(&mut state, n, *control0, *control1, *target);
            }
            Instruction::Swap { a, b } => {
                kernels::apply_swap(&mut state, n, *a, *b);
            }
            Instruction::Barrier => {}
            Instruction::Measure { qubit } => {
                collapse(&mut state, *qubit, rng);
            }
            Instruction::Reset { qubit } => {
                let outcome = collapse(&mut state, *qubit, rng);
                if outcome == 1 {
                    kernels::apply_single(&mut state, n, *qubit, &gate::x());
                }
            }
        }
    }

    (0..n).map(|q| kernels::rdm_from_statevector(&state, n, q)).collect()
}

/// Projectively measure `qubit`, collapsing and renormalizing `state` in
/// place, and return the sampled outcome (spec §4.6).
fn collapse(state: &mut [C], qubit: usize, rng: &mut SmallRng) -> usize {
    let p0: f64 = state
        .iter()
        .enumerate()
        .filter(|(b, _)| bit(*b, qubit) == 0)
        .map(|(_, a)| a.norm_sqr())
        .sum();
    let outcome = if rng.gen::<f64>() < p0 { 0 } else { 1 };
    let p = if outcome == 0 { p0 } else { 1.0 - p0 };
    let norm = p.sqrt().max(1e-300);
    for (b, amp) in state.iter_mut().enumerate() {
        if bit(b, qubit) == outcome {
            *amp = *amp / norm;
        } else {
            *amp = C::new(0.0, 0.0);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(n: usize, instrs: Vec<Instruction>, shots: u64, seed: u64) -> Vec<Rdm> {
        let circuit = Circuit::new(n, instrs);
        let cfg = SimConfig { min_shots: 1, ..SimConfig::default() };
        TrajectoryPipeline { seed: Some(seed) }
            .run(&circuit, shots, &cfg, &CancellationToken::new())
            .unwrap()
    }

    #[test]
    fn bell_state_converges_to_maximally_mixed_marginals_scenario_g() {
        let rdms = run(
            2,
            vec![
                Instruction::Unitary1 { matrix: gate::h(), qubit: 0 },
                Instruction::Controlled1 { matrix: gate::x(), control: 0, target: 1 },
                Instruction::Measure { qubit: 0 },
            ],
            20_000,
            1234,
        );
        for rho in &rdms {
            assert!((rho[(0, 0)].re - 0.5).abs() < 0.05);
            assert!((rho[(1, 1)].re - 0.5).abs() < 0.05);
        }
    }

    #[test]
    fn reset_always_returns_to_ground_state() {
        let rdms = run(1, vec![Instruction::Unitary1 { matrix: gate::x(), qubit: 0 }, Instruction::Reset { qubit: 0 }], 200, 7);
        let rho = rdms[0];
        assert!((rho[(0, 0)].re - 1.0).abs() < 1e-9);
        assert!(rho[(1, 1)].re.abs() < 1e-9);
    }

    #[test]
    fn same_seed_reruns_bitwise_identically() {
        let instrs = || {
            vec![
                Instruction::Unitary1 { matrix: gate::h(), qubit: 0 },
                Instruction::Controlled1 { matrix: gate::x(), control: 0, target: 1 },
                Instruction::Measure { qubit: 1 },
            ]
        };
        let a = run(2, instrs(), 500, 42);
        let b = run(2, instrs(), 500, 42);
        for (x, y) in a.iter().zip(b.iter()) {
            for i in 0..2 {
                for j in 0..2 {
                    assert_eq!(x[(i, j)], y[(i, j)]);
                }
            }
        }
    }

    #[test]
    fn cancellation_reports_cancelled_error() {
        let circuit = Circuit::new(1, vec![Instruction::Unitary1 { matrix: gate::h(), qubit: 0 }]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let cfg = SimConfig { min_shots: 1, ..SimConfig::default() };
        let err = TrajectoryPipeline { seed: Some(1) }.run(&circuit, 100, &cfg, &cancel).unwrap_err();
        assert!(matches!(err, SimError::Cancelled));
    }
}
