//! C6 — Solve Driver: the two-phase strategy of spec §4.6. Phase 1 builds
//! a strict model (hard coverage/clinic-coverage); if the oracle reports
//! anything other than `Optimal`/`OptimalInaccurate`, Phase 2 rebuilds
//! with coverage and clinic-coverage relaxed via Big-M slack and the
//! oracle is invoked again. Grounded on `prime_scheduler_wrapper.py`'s
//! `build_and_solve`, which retries with `"big_m"` relaxation on
//! `cp.OPTIMAL_INACCURATE`/infeasible status from the first CBC pass.

use crate::availability::AvailabilityIndex;
use crate::calendar::Calendar;
use crate::catalogue::PostCatalogue;
use crate::config::SolverConfig;
use crate::constraints::{self, Phase};
use crate::domain::{Doctor, Unit};
use crate::error::{EngineError, EngineResult};
use crate::model::Model;
use crate::oracle::{OracleOutcome, SolverOracle, SolverStatus};
use crate::variables::VariableSet;
use std::time::Duration;
use tracing::{info, warn};

pub struct SolveResult {
    pub model: Model,
    pub variables: VariableSet,
    pub outcome: OracleOutcome,
    pub phase_used: Phase,
}

#[allow(clippy::too_many_arguments)]
pub fn solve(
    oracle: &dyn SolverOracle,
    doctors: &[Doctor],
    units: &[Unit],
    calendar: &Calendar,
    catalogue: &PostCatalogue,
    availability: &AvailabilityIndex,
    config: &SolverConfig,
) -> EngineResult<SolveResult> {
    let timeout = Duration::from_secs(config.solver_timeout_seconds);

    let (model1, vars1) = build_phase(doctors, units, calendar, catalogue, availability, config, Phase::Strict);
    info!(num_vars = model1.num_vars(), num_constraints = model1.constraints.len(), "phase 1 model built");
    let outcome1 = oracle.solve(&model1, timeout);

    if matches!(outcome1.status, SolverStatus::Optimal | SolverStatus::OptimalInaccurate) {
        return Ok(SolveResult { model: model1, variables: vars1, outcome: outcome1, phase_used: Phase::Strict });
    }

    warn!(status = ?outcome1.status, "phase 1 infeasible, rebuilding with big-M relaxation");

    let (model2, vars2) = build_phase(doctors, units, calendar, catalogue, availability, config, Phase::Relaxed);
    info!(num_vars = model2.num_vars(), num_constraints = model2.constraints.len(), "phase 2 model built");
    let outcome2 = oracle.solve(&model2, timeout);

    if matches!(outcome2.status, SolverStatus::Optimal | SolverStatus::OptimalInaccurate) {
        return Ok(SolveResult { model: model2, variables: vars2, outcome: outcome2, phase_used: Phase::Relaxed });
    }

    Err(EngineError::SolverFailure { status: format!("{:?}", outcome2.status) })
}

fn build_phase(
    doctors: &[Doctor],
    units: &[Unit],
    calendar: &Calendar,
    catalogue: &PostCatalogue,
    availability: &AvailabilityIndex,
    config: &SolverConfig,
    phase: Phase,
) -> (Model, VariableSet) {
    let mut model = Model::new();
    let vars = VariableSet::build(&mut model, doctors, calendar, catalogue, availability);
    constraints::build(&mut model, &vars, doctors, units, calendar, catalogue, availability, config, phase);
    (model, vars)
}
