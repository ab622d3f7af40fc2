//! Error taxonomy for the scheduling engine (spec §7).
//!
//! `UncoverableSlot` and weekend-pairing infeasibility are *not* errors —
//! they are warnings accumulated in [`crate::report::Report`]. Only the
//! conditions that abort a solve live here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid schedule request: {0}")]
    InputError(String),

    #[error("no solver oracle available")]
    SolverUnavailable,

    #[error("solver returned unusable status in phase 2: {status}")]
    SolverFailure { status: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
