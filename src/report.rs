//! C8 — Reporter: bundles a solve into the shape spec §6 returns —
//! adopted solver status, objective value, assignments, statistics,
//! post-availability breakdown, and the non-fatal warnings accumulated
//! along the way (uncoverable slots, weekend-pairing relaxation).

use crate::availability::AvailabilityIndex;
use crate::calendar::Calendar;
use crate::catalogue::PostCatalogue;
use crate::constraints::Phase;
use crate::domain::{Doctor, STANDBY_ONCALL};
use crate::extract::{self, AssignmentRow, Statistics};
use crate::oracle::{OracleOutcome, SolverStatus};
use crate::solve::SolveResult;
use crate::variables::VariableSet;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub enum Warning {
    /// A `(day, post)` slot with zero eligible doctors, found while
    /// defaulting availability.
    UncoverableSlot { day_index: usize, post: String },
    /// Phase 1 (strict coverage) was infeasible; Phase 2's Big-M
    /// relaxation was used instead, so some coverage/clinic-coverage
    /// targets may be short.
    CoverageRelaxed,
    /// A weekend pair whose Saturday-eligible and Sunday-eligible Standby
    /// doctor sets don't intersect: no single doctor can legally hold the
    /// pair, so `y[d,w]` is forced to 0 for every d at that weekend.
    WeekendPairingInfeasible { weekend_index: usize },
    /// An on-call post name matches none of the `Ward*`/`ED*`/`Registrar*`
    /// prefix conventions the category penalties key off of, so none of
    /// those penalties ever apply to it.
    UnrecognisedPostPrefix { post: String },
}

#[derive(Debug, Clone)]
pub struct Report {
    pub status: SolverStatus,
    pub phase_used: Phase,
    pub objective_value: f64,
    pub assignments: Vec<AssignmentRow>,
    pub statistics: Statistics,
    pub availability_breakdown: HashMap<String, (usize, usize)>,
    pub warnings: Vec<Warning>,
}

pub fn build(result: SolveResult, doctors: &[Doctor], calendar: &Calendar, catalogue: &PostCatalogue, availability: &AvailabilityIndex) -> Report {
    let SolveResult { outcome, variables, phase_used, .. } = result;
    let OracleOutcome { status, values, objective_value } = outcome;

    let (assignments, statistics) = extract::extract(&values, doctors, calendar, &variables);

    let mut warnings: Vec<Warning> = availability
        .uncoverable
        .iter()
        .map(|(day_index, post)| Warning::UncoverableSlot { day_index: *day_index, post: post.clone() })
        .collect();
    if phase_used == Phase::Relaxed {
        warnings.push(Warning::CoverageRelaxed);
    }
    warnings.extend(weekend_pairing_warnings(doctors, calendar, availability, &variables));
    warnings.extend(
        catalogue
            .unrecognised_posts()
            .into_iter()
            .map(|post| Warning::UnrecognisedPostPrefix { post: post.to_string() }),
    );

    Report {
        status,
        phase_used,
        objective_value,
        assignments,
        statistics,
        availability_breakdown: availability.breakdown_by_post(),
        warnings,
    }
}

/// For each weekend pair, checks whether any doctor is eligible for
/// `Standby Oncall` on both the Saturday and the Sunday. Informational
/// only — the model already forces `y[d,w] = 0` wherever the pairing
/// can't be satisfied (see `constraints::weekend_pairing`); this just
/// surfaces *why* to the caller. Skipped when the pair has no materialised
/// Standby variable at all (the post isn't offered that weekend).
/// Grounded on `check_standby_pairing_feasibility` in
/// `prime_scheduler_wrapper.py`.
fn weekend_pairing_warnings(doctors: &[Doctor], calendar: &Calendar, availability: &AvailabilityIndex, vars: &VariableSet) -> Vec<Warning> {
    calendar
        .weekend_pairs
        .iter()
        .enumerate()
        .filter_map(|(w, pair)| {
            let post_offered = doctors.iter().any(|d| vars.standby_var(d.index, pair.sat).is_some() || vars.standby_var(d.index, pair.sun).is_some());
            if !post_offered {
                return None;
            }
            let sat_eligible = availability.eligible_doctors(doctors, pair.sat, STANDBY_ONCALL);
            let sun_eligible = availability.eligible_doctors(doctors, pair.sun, STANDBY_ONCALL);
            let intersects = sat_eligible.intersection(&sun_eligible).next().is_some();
            (!intersects).then_some(Warning::WeekendPairingInfeasible { weekend_index: w })
        })
        .collect()
}
