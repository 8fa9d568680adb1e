//! The external request/response contract (spec §6.1).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::router::PipelineKind;

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationRequest {
    pub qasm_code: String,
    #[serde(default = "default_shots")]
    pub shots: u64,
    #[serde(default)]
    pub pipeline_override: Option<PipelineKind>,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_shots() -> u64 {
    1024
}

/// A complex amplitude on the wire: `[re, im]`.
pub type WireComplex = [f64; 2];

#[derive(Debug, Clone, Serialize)]
pub struct QubitReport {
    pub id: usize,
    pub label: String,
    pub bloch_coords: [f64; 3],
    pub purity: f64,
    pub density_matrix: [[WireComplex; 2]; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct CircuitInfoReport {
    pub num_qubits: usize,
    pub num_operations: usize,
    pub is_unitary: bool,
    pub gate_histogram: HashMap<String, u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResponse {
    pub qubits: Vec<QubitReport>,
    pub pipeline_used: PipelineKind,
    pub execution_time_seconds: f64,
    pub shots_used: u64,
    pub circuit_info: CircuitInfoReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub kind: &'static str,
    pub message: String,
    pub detail: Option<String>,
}

impl From<&crate::error::SimError> for ErrorResponse {
    fn from(e: &crate::error::SimError) -> Self {
        use crate::error::SimError::*;
        let kind = match e {
            Parse { .. } => "ParseError",
            Validation { .. } => "ValidationError",
            Router(_) => "RouterError",
            Resource(_) => "ResourceError",
            Numerical(_) => "NumericalError",
            Cancelled => "Cancelled",
            Internal => "InternalError",
        };
        ErrorResponse { kind, message: e.to_string(), detail: None }
    }
}
