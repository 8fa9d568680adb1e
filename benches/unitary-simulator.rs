#[macro_use]
extern crate bencher;

use bencher::Bencher;

use bloch_sim_core::cancel::CancellationToken;
use bloch_sim_core::ir::{Circuit, Instruction};
use bloch_sim_core::pipelines::unitary::UnitaryPipeline;
use bloch_sim_core::pipelines::Pipeline;
use bloch_sim_core::{gate, SimConfig};

/// A 10-qubit GHZ chain: one `h` plus nine `cx`, the same hot path
/// `kernels::apply_single`/`apply_controlled` touch per gate.
fn ghz_circuit(n: usize) -> Circuit {
    let mut instrs = vec![Instruction::Unitary1 { matrix: gate::h(), qubit: 0 }];
    for q in 0..n - 1 {
        instrs.push(Instruction::Controlled1 { matrix: gate::x(), control: q, target: q + 1 });
    }
    Circuit::new(n, instrs)
}

fn bench_ghz_statevector_and_rdm(b: &mut Bencher) {
    let circuit = ghz_circuit(10);
    let cfg = SimConfig::default();
    let cancel = CancellationToken::new();
    b.iter(|| UnitaryPipeline.run(&circuit, 0, &cfg, &cancel).unwrap());
}

benchmark_group!(benches, bench_ghz_statevector_and_rdm);
benchmark_main!(benches);
