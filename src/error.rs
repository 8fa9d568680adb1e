//! The closed, flat error taxonomy of the simulation core.
//!
//! Every fallible operation in this crate returns `Result<_, SimError>`.
//! Errors are never swallowed or silently converted between kinds; a
//! pipeline that fails midway discards its partial state rather than
//! reporting it (see each pipeline's `run`).

use std::fmt;

/// The cap that a [`SimError::Validation`] or [`SimError::Router`] tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapKind {
    MaxQubits,
    MaxOperations,
    MaxShots,
    WallClock,
}

impl fmt::Display for CapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CapKind::MaxQubits => "max_qubits",
            CapKind::MaxOperations => "max_operations",
            CapKind::MaxShots => "max_shots",
            CapKind::WallClock => "wall_clock",
        };
        f.write_str(s)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SimError {
    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("validation error ({cap}): {detail}")]
    Validation { cap: CapKind, detail: String },

    #[error("router error: {0}")]
    Router(String),

    #[error("resource error: {0}")]
    Resource(String),

    #[error("numerical error: {0}")]
    Numerical(String),

    #[error("cancelled")]
    Cancelled,

    /// Opaque to the caller by design (see spec §7); the triggering detail
    /// is logged with `log::error!` at the construction site, never
    /// returned in the error itself.
    #[error("internal error")]
    Internal,
}

impl SimError {
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        SimError::Parse { line, reason: reason.into() }
    }

    pub fn validation(cap: CapKind, detail: impl Into<String>) -> Self {
        SimError::Validation { cap, detail: detail.into() }
    }

    pub fn internal(detail: impl fmt::Display) -> Self {
        log::error!("internal error: {}", detail);
        SimError::Internal
    }
}
