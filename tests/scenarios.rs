//! End-to-end scenario tests driven through the public `simulate()` entry
//! point only (unit-level pipeline behavior is covered inline in each
//! `src/pipelines/*.rs`).

use std::f64::consts::PI;

use bloch_sim_core::router::PipelineKind;
use bloch_sim_core::{simulate, SimConfig, SimulationRequest};

fn request(qasm: &str) -> SimulationRequest {
    SimulationRequest { qasm_code: qasm.to_string(), shots: 2048, pipeline_override: None, seed: Some(1) }
}

#[test]
fn scenario_a_single_hadamard() {
    let qasm = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[1];\nh q[0];";
    let resp = simulate(request(qasm), &SimConfig::default()).unwrap();
    assert_eq!(resp.pipeline_used, PipelineKind::Unitary);
    let q = &resp.qubits[0];
    assert!((q.bloch_coords[0] - 1.0).abs() < 1e-6);
    assert!(q.bloch_coords[1].abs() < 1e-6);
    assert!(q.bloch_coords[2].abs() < 1e-6);
    assert!((q.purity - 1.0).abs() < 1e-6);
}

#[test]
fn scenario_b_bell_pair() {
    let qasm = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\nh q[0];\ncx q[0],q[1];";
    let resp = simulate(request(qasm), &SimConfig::default()).unwrap();
    assert_eq!(resp.pipeline_used, PipelineKind::Unitary);
    for q in &resp.qubits {
        assert!((q.purity - 0.5).abs() < 1e-6);
        assert_eq!(q.bloch_coords, [0.0, 0.0, 0.0]);
    }
}

#[test]
fn scenario_c_ghz_triple() {
    let qasm = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[3];\nh q[0];\ncx q[0],q[1];\ncx q[1],q[2];";
    let resp = simulate(request(qasm), &SimConfig::default()).unwrap();
    assert_eq!(resp.qubits.len(), 3);
    for q in &resp.qubits {
        assert!((q.purity - 0.5).abs() < 1e-6);
    }
}

#[test]
fn scenario_d_ry_then_z() {
    let qasm = format!(
        "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[1];\nry({}) q[0];\nz q[0];",
        PI / 2.0
    );
    let resp = simulate(request(&qasm), &SimConfig::default()).unwrap();
    let q = &resp.qubits[0];
    assert!((q.bloch_coords[0] - (-1.0)).abs() < 1e-6);
}

#[test]
fn scenario_e_measurement_forces_mixed_marginal() {
    let qasm = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nh q[0];\ncx q[0],q[1];\nmeasure q[0] -> c[0];";
    let resp = simulate(request(qasm), &SimConfig::default()).unwrap();
    assert_eq!(resp.pipeline_used, PipelineKind::ExactDensity);
    for q in &resp.qubits {
        assert!((q.purity - 0.5).abs() < 1e-6);
    }
}

#[test]
fn scenario_f_reset_returns_to_ground_state() {
    let qasm = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[1];\nh q[0];\nreset q[0];";
    let resp = simulate(request(qasm), &SimConfig::default()).unwrap();
    assert_eq!(resp.pipeline_used, PipelineKind::ExactDensity);
    let q = &resp.qubits[0];
    assert!((q.purity - 1.0).abs() < 1e-6);
    assert!((q.bloch_coords[2] - 1.0).abs() < 1e-6);
}

#[test]
fn scenario_g_trajectory_pipeline_converges() {
    let mut qubits = String::new();
    for i in 0..9 {
        qubits.push_str(&format!("cx q[{i}],q[{}];\n", i + 1));
    }
    let qasm = format!(
        "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[10];\ncreg c[10];\nh q[0];\n{qubits}measure q[0] -> c[0];"
    );
    let cfg = SimConfig::default();
    let mut req = request(&qasm);
    req.shots = 5000;
    let resp = simulate(req, &cfg).unwrap();
    assert_eq!(resp.pipeline_used, PipelineKind::Trajectory);
    for q in &resp.qubits {
        assert!((q.purity - 0.5).abs() < 0.05);
    }
}

#[test]
fn property_7_rerunning_the_same_request_is_deterministic_for_deterministic_pipelines() {
    let qasm = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\nh q[0];\ncx q[0],q[1];";
    let a = simulate(request(qasm), &SimConfig::default()).unwrap();
    let b = simulate(request(qasm), &SimConfig::default()).unwrap();
    for (qa, qb) in a.qubits.iter().zip(b.qubits.iter()) {
        assert_eq!(qa.bloch_coords, qb.bloch_coords);
        assert_eq!(qa.density_matrix, qb.density_matrix);
    }
}

#[test]
fn property_8_same_seed_trajectory_reruns_are_bitwise_identical() {
    let mut qubits = String::new();
    for i in 0..5 {
        qubits.push_str(&format!("cx q[{i}],q[{}];\n", i + 1));
    }
    let qasm = format!(
        "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[6];\ncreg c[6];\nh q[0];\n{qubits}measure q[0] -> c[0];"
    );
    let mut req = request(&qasm);
    req.shots = 1000;
    let a = simulate(req.clone(), &SimConfig::default()).unwrap();
    let b = simulate(req, &SimConfig::default()).unwrap();
    for (qa, qb) in a.qubits.iter().zip(b.qubits.iter()) {
        assert_eq!(qa.density_matrix, qb.density_matrix);
    }
}

#[test]
fn property_11_unitary_and_exact_density_agree_on_a_unitary_circuit() {
    let qasm = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\nh q[0];\ncx q[0],q[1];";

    let mut unitary_req = request(qasm);
    unitary_req.pipeline_override = Some(PipelineKind::Unitary);
    let unitary_resp = simulate(unitary_req, &SimConfig::default()).unwrap();

    let mut density_req = request(qasm);
    density_req.pipeline_override = Some(PipelineKind::ExactDensity);
    let density_resp = simulate(density_req, &SimConfig::default()).unwrap();

    for (u, d) in unitary_resp.qubits.iter().zip(density_resp.qubits.iter()) {
        assert!((u.purity - d.purity).abs() < 1e-6);
        for i in 0..3 {
            assert!((u.bloch_coords[i] - d.bloch_coords[i]).abs() < 1e-6);
        }
    }
}

#[test]
fn unsupported_gate_surfaces_as_parse_error() {
    let qasm = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[1];\nbogus q[0];";
    let err = simulate(request(qasm), &SimConfig::default()).unwrap_err();
    assert!(matches!(err, bloch_sim_core::SimError::Parse { .. }));
}

#[test]
fn forcing_unitary_pipeline_on_a_measuring_circuit_is_a_router_error() {
    let qasm = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[1];\ncreg c[1];\nh q[0];\nmeasure q[0] -> c[0];";
    let mut req = request(qasm);
    req.pipeline_override = Some(PipelineKind::Unitary);
    let err = simulate(req, &SimConfig::default()).unwrap_err();
    assert!(matches!(err, bloch_sim_core::SimError::Router(_)));
}
