//! Quantum circuit simulation core for a Bloch-sphere visualizer.
//!
//! `simulate` ties the pipeline together end to end: parse -> validate ->
//! route -> simulate -> postprocess -> report. The orchestrator owns the
//! wall-clock watchdog and the [`cancel::CancellationToken`] that every
//! pipeline polls; nothing below this module knows about wall-clock time at
//! all (spec §5).

pub mod api;
pub mod cancel;
pub mod complex;
pub mod config;
pub mod error;
pub mod gate;
pub mod ir;
pub mod kernels;
pub mod math;
pub mod parser;
pub mod pipelines;
pub mod result;
pub mod router;
pub mod rng;
pub mod validator;

use std::time::{Duration, Instant};

pub use api::{ErrorResponse, SimulationRequest, SimulationResponse};
pub use config::SimConfig;
pub use error::SimError;

use cancel::CancellationToken;

/// Run one request through the full pipeline under `cfg`'s caps.
///
/// A background thread flips the returned work's [`CancellationToken`]
/// after `cfg.wall_clock_limit` elapses; the watchdog thread is always
/// joined before `simulate` returns, win or lose, so no thread outlives
/// the call (spec §5).
pub fn simulate(request: SimulationRequest, cfg: &SimConfig) -> Result<SimulationResponse, SimError> {
    let start = Instant::now();
    validator::validate_shots(request.shots, cfg)?;

    let parsed = parser::parse(&request.qasm_code, cfg)?;
    let info = validator::validate(&parsed.circuit, parsed.gate_histogram, cfg)?;
    let pipeline_kind = router::route(&info, request.pipeline_override, cfg)?;

    let cancel = CancellationToken::new();
    let watchdog = spawn_watchdog(cancel.clone(), cfg.wall_clock_limit);

    let shots_used = if pipeline_kind == router::PipelineKind::Trajectory {
        request.shots.clamp(cfg.min_shots, cfg.max_shots)
    } else {
        0
    };
    let rdms = pipelines::run(pipeline_kind, &parsed.circuit, request.shots, request.seed, cfg, &cancel);

    cancel.cancel();
    let _ = watchdog.join();

    let rdms = rdms?;
    let execution_time_seconds = start.elapsed().as_secs_f64();
    log::info!("simulate: finished in {execution_time_seconds:.6}s via {pipeline_kind:?}");
    result::assemble(rdms, pipeline_kind, execution_time_seconds, shots_used, &info)
}

/// Spawn the wall-clock watchdog thread. Cancelling is idempotent and
/// harmless after `simulate` has already returned, so the thread needs no
/// cooperation from the caller beyond being joined.
fn spawn_watchdog(cancel: CancellationToken, limit: Duration) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let deadline = Instant::now() + limit;
        while Instant::now() < deadline {
            if cancel.is_cancelled() {
                return;
            }
            std::thread::sleep(Duration::from_millis(20).min(limit));
        }
        cancel.cancel();
    })
}
