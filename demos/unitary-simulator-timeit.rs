//! Timing harness exercising `simulate()` end to end against a fixed QASM
//! circuit, generalizing the teacher's own `unitary-simulator-timeit.rs`
//! (which timed `UnitarySimulator::run()` after parsing through
//! `QiskitPython`) to the full parse -> validate -> route -> simulate ->
//! postprocess -> report pipeline.

use std::env;
use std::process::exit;
use std::str::FromStr;
use std::time::{Duration, Instant};

use bloch_sim_core::{simulate, SimConfig, SimulationRequest};

const GHZ_QASM: &str = r#"OPENQASM 2.0;
include "qelib1.inc";
qreg q[4];
h q[0];
cx q[0],q[1];
cx q[1],q[2];
cx q[2],q[3];"#;

fn bench_circuit(num_iters: u64) {
    let cfg = SimConfig::default();
    let mut sum = Duration::new(0, 0);
    for _ in 0..num_iters {
        let request = SimulationRequest {
            qasm_code: GHZ_QASM.to_string(),
            shots: cfg.default_shots,
            pipeline_override: None,
            seed: None,
        };
        let now = Instant::now();
        simulate(request, &cfg).unwrap();
        sum += now.elapsed();
    }
    println!(
        "Circuit run: {} times. Total time: {}",
        num_iters,
        sum.as_secs() as f64 + sum.subsec_nanos() as f64 * 1e-9
    );
}

fn usage() {
    println!(
        r#"Error: No valid arguments given!
You need to pass the number of iterations to run the benchmark.
        "#
    );
    exit(1);
}

fn main() {
    env_logger::init();

    let num_iters = match env::args().nth(1) {
        Some(n) => match u64::from_str(n.as_str()) {
            Ok(num_iters) => num_iters,
            _ => {
                usage();
                0u64
            }
        },
        None => {
            usage();
            0u64
        }
    };

    bench_circuit(num_iters);
}
