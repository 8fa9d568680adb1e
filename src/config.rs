//! Resource caps and pool sizing, injected rather than hard-coded so tests
//! can shrink the caps instead of allocating a 24-qubit statevector.

use std::time::Duration;

/// Caps enforced by the validator, router, and orchestrator (spec §4.2, §5).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub max_qubits: usize,
    pub max_operations: usize,
    pub min_shots: u64,
    pub max_shots: u64,
    pub default_shots: u64,
    pub wall_clock_limit: Duration,
    /// Upper bound on the trajectory worker pool; the actual pool is
    /// `min(available_parallelism, worker_pool_cap)`.
    pub worker_pool_cap: usize,
    pub unitary_qubit_limit: usize,
    pub exact_density_qubit_limit: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            max_qubits: 24,
            max_operations: 1000,
            min_shots: 100,
            max_shots: 100_000,
            default_shots: 1024,
            wall_clock_limit: Duration::from_secs(300),
            worker_pool_cap: 16,
            unitary_qubit_limit: 20,
            exact_density_qubit_limit: 8,
        }
    }
}
