//! C5 — Constraint Builder: emits every hard and soft linear (in)equality
//! of spec §4.5, plus the objective. Grounded line-for-line on
//! `prime_scheduler_wrapper.py`'s `build_and_solve` (see DESIGN.md for
//! exact citations per rule). Replaces the teacher's `constraints.rs`
//! (which built `solverforge` fluent constraint streams over
//! Employee/Shift) with direct `Model` construction over
//! Doctor/Day/Post — same module name and role, new body.

use crate::availability::AvailabilityIndex;
use crate::calendar::Calendar;
use crate::catalogue::PostCatalogue;
use crate::config::SolverConfig;
use crate::domain::{Category, Doctor, Unit, STANDBY_ONCALL};
use crate::model::{LinExpr, Model, Relation};
use crate::variables::VariableSet;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Strict feasibility build: coverage and clinic coverage are hard.
    Strict,
    /// Big-M relaxed build: coverage and clinic coverage become soft.
    Relaxed,
}

/// Builds every constraint and objective term for the given phase.
#[allow(clippy::too_many_arguments)]
pub fn build(
    model: &mut Model,
    vars: &VariableSet,
    doctors: &[Doctor],
    units: &[Unit],
    calendar: &Calendar,
    catalogue: &PostCatalogue,
    _availability: &AvailabilityIndex,
    config: &SolverConfig,
    phase: Phase,
) {
    coverage(model, vars, doctors, calendar, catalogue, config, phase);
    one_post_per_day(model, vars, doctors, calendar, catalogue);
    clinic_coverage(model, vars, doctors, units, calendar, config, phase);
    weekend_pairing(model, vars, doctors, calendar);
    weekend_cooldown(model, vars, doctors, calendar);
    weekend_horizon_cap(model, vars, doctors, calendar);
    multiple_standby_overflow(model, vars, doctors, calendar);
    rest(model, vars, doctors, calendar, catalogue, config);
    clinic_day_conflict(model, vars, doctors, units, calendar, catalogue, config);
    workload_standby_penalty(model, vars, doctors, calendar, config);
    category_penalties(model, vars, doctors, calendar, catalogue, config);
    minimum_one(model, vars, doctors, calendar, catalogue, config);
    gap_reward(model, vars, doctors, calendar, catalogue, config);
    unit_over_coverage(model, vars, doctors, units, calendar, catalogue, config);

    finalize_objective(model, vars, doctors, calendar, catalogue);
}

fn coverage(
    model: &mut Model,
    vars: &VariableSet,
    doctors: &[Doctor],
    calendar: &Calendar,
    catalogue: &PostCatalogue,
    config: &SolverConfig,
    phase: Phase,
) {
    for (s, day) in calendar.days.iter().enumerate() {
        for post in catalogue.posts_for_weekday(day.weekday) {
            let assigned: Vec<_> = doctors.iter().filter_map(|d| vars.x_var(d.index, s, post)).collect();
            if assigned.is_empty() {
                continue;
            }
            match phase {
                Phase::Strict => {
                    model.add_constraint(format!("coverage[{s},{post}]"), LinExpr::sum(assigned), Relation::Eq, 1.0);
                }
                Phase::Relaxed => {
                    let slack = model.new_continuous_var(format!("coverage_slack[{s},{post}]"));
                    let mut expr = LinExpr::sum(assigned);
                    expr.add_term(slack, 1.0);
                    model.add_constraint(format!("coverage[{s},{post}]"), expr, Relation::Ge, 1.0);
                    model.add_objective_term(slack, config.big_m);
                }
            }
        }
    }
}

fn one_post_per_day(model: &mut Model, vars: &VariableSet, doctors: &[Doctor], calendar: &Calendar, catalogue: &PostCatalogue) {
    for doctor in doctors {
        for (s, day) in calendar.days.iter().enumerate() {
            let day_vars: Vec<_> = catalogue
                .posts_for_weekday(day.weekday)
                .iter()
                .filter_map(|t| vars.x_var(doctor.index, s, t))
                .collect();
            if !day_vars.is_empty() {
                model.add_constraint(format!("one_post_per_day[{},{}]", doctor.index, s), LinExpr::sum(day_vars), Relation::Le, 1.0);
            }
        }
    }
}

fn clinic_coverage(
    model: &mut Model,
    vars: &VariableSet,
    doctors: &[Doctor],
    units: &[Unit],
    calendar: &Calendar,
    config: &SolverConfig,
    phase: Phase,
) {
    use crate::domain::PostKind;

    for unit in units {
        let clinic_post = PostKind::clinic_name(&unit.name);
        let unit_docs: Vec<&Doctor> = doctors.iter().filter(|d| d.unit == unit.name).collect();
        for (s, day) in calendar.days.iter().enumerate() {
            if !unit.runs_clinic_on(day.weekday) {
                continue;
            }
            let clinic_vars: Vec<_> = unit_docs.iter().filter_map(|d| vars.x_var(d.index, s, &clinic_post)).collect();
            if clinic_vars.is_empty() {
                continue;
            }
            match phase {
                Phase::Strict => {
                    model.add_constraint(
                        format!("clinic_coverage[{s},{}]", unit.name),
                        LinExpr::sum(clinic_vars),
                        Relation::Eq,
                        1.0,
                    );
                }
                Phase::Relaxed => {
                    let slack = model.new_continuous_var(format!("clinic_slack[{s},{}]", unit.name));
                    let mut expr = LinExpr::sum(clinic_vars);
                    expr.add_term(slack, 1.0);
                    model.add_constraint(format!("clinic_coverage[{s},{}]", unit.name), expr, Relation::Ge, 1.0);
                    model.add_objective_term(slack, config.big_m);
                }
            }
        }
    }
}

fn weekend_pairing(model: &mut Model, vars: &VariableSet, doctors: &[Doctor], calendar: &Calendar) {
    for w in 0..calendar.weekend_pairs.len() {
        for doctor in doctors {
            let y = *vars.y.get(&(doctor.index, w)).expect("y[d,w] materialised for every (d,w)");
            let pair = &calendar.weekend_pairs[w];
            let sat_var = vars.standby_var(doctor.index, pair.sat);
            let sun_var = vars.standby_var(doctor.index, pair.sun);

            match (sat_var, sun_var) {
                (Some(sat), Some(sun)) => {
                    // AND-linearisation: y <= sat, y <= sun, y >= sat + sun - 1.
                    model.add_constraint(
                        format!("y_le_sat[{},{}]", doctor.index, w),
                        LinExpr { terms: vec![(y, 1.0), (sat, -1.0)] },
                        Relation::Le,
                        0.0,
                    );
                    model.add_constraint(
                        format!("y_le_sun[{},{}]", doctor.index, w),
                        LinExpr { terms: vec![(y, 1.0), (sun, -1.0)] },
                        Relation::Le,
                        0.0,
                    );
                    model.add_constraint(
                        format!("y_ge_and[{},{}]", doctor.index, w),
                        LinExpr { terms: vec![(y, 1.0), (sat, -1.0), (sun, -1.0)] },
                        Relation::Ge,
                        -1.0,
                    );
                    // Same doctor must hold both days of the pair.
                    model.add_constraint(
                        format!("sat_eq_sun[{},{}]", doctor.index, w),
                        LinExpr { terms: vec![(sat, 1.0), (sun, -1.0)] },
                        Relation::Eq,
                        0.0,
                    );
                }
                _ => {
                    // Not available on both days: y forced to 0.
                    model.add_constraint(format!("y_forced_zero[{},{}]", doctor.index, w), LinExpr::single(y, 1.0), Relation::Eq, 0.0);
                }
            }
        }
    }
}

fn weekend_cooldown(model: &mut Model, vars: &VariableSet, doctors: &[Doctor], calendar: &Calendar) {
    for doctor in doctors {
        for w in 0..calendar.weekend_pairs.len().saturating_sub(1) {
            let y_w = *vars.y.get(&(doctor.index, w)).unwrap();
            let y_w1 = *vars.y.get(&(doctor.index, w + 1)).unwrap();
            model.add_constraint(
                format!("weekend_cooldown[{},{}]", doctor.index, w),
                LinExpr { terms: vec![(y_w, 1.0), (y_w1, 1.0)] },
                Relation::Le,
                1.0,
            );
        }
    }
}

fn weekend_horizon_cap(model: &mut Model, vars: &VariableSet, doctors: &[Doctor], calendar: &Calendar) {
    for doctor in doctors {
        let weekend_vars: Vec<_> = (0..calendar.weekend_pairs.len()).filter_map(|w| vars.y.get(&(doctor.index, w)).copied()).collect();
        if !weekend_vars.is_empty() {
            model.add_constraint(format!("weekend_cap[{}]", doctor.index), LinExpr::sum(weekend_vars), Relation::Le, 1.0);
        }
    }
}

fn multiple_standby_overflow(model: &mut Model, vars: &VariableSet, doctors: &[Doctor], calendar: &Calendar) {
    for doctor in doctors {
        let weekend_vars: Vec<_> = (0..calendar.weekend_pairs.len()).filter_map(|w| vars.y.get(&(doctor.index, w)).copied()).collect();
        if weekend_vars.is_empty() {
            continue;
        }
        let k = *vars.multiple_weekend_penalty.get(&doctor.index).unwrap();
        let mut expr = LinExpr::sum(weekend_vars);
        expr.add_term(k, -1.0);
        model.add_constraint(format!("multiple_standby[{}]", doctor.index), expr, Relation::Le, 1.0);
        model.add_objective_term(k, 1000.0);
    }
}

/// True iff day `s`/`s+1` is the Sat→Sun pair covered by a `Standby Oncall`
/// post on both sides — the pair the rest rule carves out, matching
/// `prime_scheduler_wrapper.py`'s `is_standby_weekend` test.
fn is_standby_weekend_pair(calendar: &Calendar, catalogue: &PostCatalogue, s: usize) -> bool {
    let today = &calendar.days[s];
    let tomorrow = &calendar.days[s + 1];
    today.weekday == 5
        && tomorrow.weekday == 6
        && catalogue.posts_for_weekday(today.weekday).iter().any(|t| t == STANDBY_ONCALL)
        && catalogue.posts_for_weekday(tomorrow.weekday).iter().any(|t| t == STANDBY_ONCALL)
}

fn rest(model: &mut Model, vars: &VariableSet, doctors: &[Doctor], calendar: &Calendar, catalogue: &PostCatalogue, config: &SolverConfig) {
    for doctor in doctors {
        for s in 0..calendar.len().saturating_sub(1) {
            let standby_weekend = is_standby_weekend_pair(calendar, catalogue, s);

            let oncall_today: Vec<_> = catalogue
                .posts_for_weekday(calendar.days[s].weekday)
                .iter()
                .filter(|t| catalogue.is_oncall(t) && !(standby_weekend && t.as_str() == STANDBY_ONCALL))
                .filter_map(|t| vars.x_var(doctor.index, s, t))
                .collect();
            let oncall_tomorrow: Vec<_> = catalogue
                .posts_for_weekday(calendar.days[s + 1].weekday)
                .iter()
                .filter(|t| catalogue.is_oncall(t) && !(standby_weekend && t.as_str() == STANDBY_ONCALL))
                .filter_map(|t| vars.x_var(doctor.index, s + 1, t))
                .collect();

            if oncall_today.is_empty() || oncall_tomorrow.is_empty() {
                continue;
            }

            let violation = *vars.rest_violation.get(&(doctor.index, s)).unwrap();
            let mut expr = LinExpr::sum(oncall_today);
            for (v, c) in LinExpr::sum(oncall_tomorrow).terms {
                expr.add_term(v, c);
            }
            expr.add_term(violation, -1.0);
            model.add_constraint(format!("rest[{},{}]", doctor.index, s), expr, Relation::Le, 1.0);
            model.add_objective_term(violation, config.lambda_rest);
        }
    }
}

fn clinic_day_conflict(
    model: &mut Model,
    vars: &VariableSet,
    doctors: &[Doctor],
    units: &[Unit],
    calendar: &Calendar,
    catalogue: &PostCatalogue,
    config: &SolverConfig,
) {
    let unit_by_name: HashMap<&str, &Unit> = units.iter().map(|u| (u.name.as_str(), u)).collect();
    for doctor in doctors {
        let Some(unit) = unit_by_name.get(doctor.unit.as_str()) else { continue };
        for (s, day) in calendar.days.iter().enumerate() {
            if !unit.runs_clinic_on(day.weekday) {
                continue;
            }
            for delta in [-1i64, 0, 1] {
                let idx = s as i64 + delta;
                if idx < 0 || idx as usize >= calendar.len() {
                    continue;
                }
                let idx = idx as usize;
                let lambda = match delta {
                    -1 => config.clinic_penalty_before,
                    0 => config.clinic_penalty_same,
                    _ => config.clinic_penalty_after,
                };
                for t in catalogue.posts_for_weekday(calendar.days[idx].weekday) {
                    if !catalogue.is_oncall(t) {
                        continue;
                    }
                    if let Some(var) = vars.x_var(doctor.index, idx, t) {
                        model.add_objective_term(var, lambda);
                    }
                }
            }
        }
    }
}

fn workload_standby_penalty(model: &mut Model, vars: &VariableSet, doctors: &[Doctor], calendar: &Calendar, config: &SolverConfig) {
    for doctor in doctors {
        let wd = &doctor.workload;
        let mut multiplier = config.lambda_standby;

        // Mutually-exclusive precedence, not additive: heaviest-recent-use
        // first, recency reward only once none of the "used recently" legs
        // fire.
        if wd.standby_count_12m > 0 {
            multiplier += 5000.0;
        } else if wd.standby_count_3m > 0 {
            multiplier += 2000.0;
        } else if wd.days_since_last_standby < 365 {
            let recency_penalty = ((365 - wd.days_since_last_standby) as f64) * 5.0;
            multiplier += recency_penalty.max(0.0);
        } else if wd.days_since_last_standby > 365 {
            let reward = (((wd.days_since_last_standby - 365) as f64) / 5.0).min(200.0);
            multiplier = (multiplier - reward).max(1.0);
        }

        for (s, _day) in calendar.days.iter().enumerate() {
            if let Some(var) = vars.x_var(doctor.index, s, STANDBY_ONCALL) {
                model.add_objective_term(var, multiplier);
            }
        }
    }
}

fn category_penalties(
    model: &mut Model,
    vars: &VariableSet,
    doctors: &[Doctor],
    calendar: &Calendar,
    catalogue: &PostCatalogue,
    config: &SolverConfig,
) {
    for doctor in doctors {
        for (s, day) in calendar.days.iter().enumerate() {
            for post in catalogue.posts_for_weekday(day.weekday) {
                let Some(var) = vars.x_var(doctor.index, s, post) else { continue };

                if doctor.category == Category::Registrar && day.is_weekend() && catalogue.is_oncall(post) && post != STANDBY_ONCALL {
                    model.add_objective_term(var, config.lambda_reg_weekend);
                }

                if doctor.category == Category::Junior && post.starts_with("Ward") {
                    model.add_objective_term(var, config.lambda_junior_ward);
                }

                if matches!(doctor.category, Category::Senior | Category::Registrar) && post.starts_with("ED") {
                    model.add_objective_term(var, config.lambda_ed);
                }
            }
        }
    }
}

fn minimum_one(model: &mut Model, vars: &VariableSet, doctors: &[Doctor], calendar: &Calendar, catalogue: &PostCatalogue, config: &SolverConfig) {
    for doctor in doctors {
        let Some(&slack) = vars.min_one_slack.get(&doctor.index) else { continue };
        let all_vars: Vec<_> = calendar
            .days
            .iter()
            .enumerate()
            .flat_map(|(s, day)| catalogue.posts_for_weekday(day.weekday).iter().filter_map(move |t| vars.x_var(doctor.index, s, t)))
            .collect();
        let mut expr = LinExpr::sum(all_vars);
        expr.add_term(slack, 1.0);
        model.add_constraint(format!("min_one[{}]", doctor.index), expr, Relation::Ge, 1.0);
        model.add_objective_term(slack, config.lambda_min_one);
    }
}

fn gap_reward(model: &mut Model, vars: &VariableSet, doctors: &[Doctor], calendar: &Calendar, catalogue: &PostCatalogue, config: &SolverConfig) {
    if calendar.len() < 3 {
        return;
    }
    for doctor in doctors {
        for s in 0..=(calendar.len() - 3) {
            let Some(&z) = vars.z_gap.get(&(doctor.index, s)) else { continue };
            let oncall_today: Vec<_> = catalogue
                .posts_for_weekday(calendar.days[s].weekday)
                .iter()
                .filter(|t| catalogue.is_oncall(t))
                .filter_map(|t| vars.x_var(doctor.index, s, t))
                .collect();
            let oncall_plus2: Vec<_> = catalogue
                .posts_for_weekday(calendar.days[s + 2].weekday)
                .iter()
                .filter(|t| catalogue.is_oncall(t))
                .filter_map(|t| vars.x_var(doctor.index, s + 2, t))
                .collect();

            if oncall_today.is_empty() || oncall_plus2.is_empty() {
                continue;
            }

            let mut expr = LinExpr::sum(oncall_today);
            for (v, c) in LinExpr::sum(oncall_plus2).terms {
                expr.add_term(v, c);
            }
            expr.add_term(z, -1.0);
            model.add_constraint(format!("gap[{},{}]", doctor.index, s), expr, Relation::Le, 1.0);
            // Reward: negative coefficient in a minimisation objective.
            model.add_objective_term(z, -config.lambda_gap);
        }
    }
}

fn unit_over_coverage(
    model: &mut Model,
    vars: &VariableSet,
    doctors: &[Doctor],
    units: &[Unit],
    calendar: &Calendar,
    catalogue: &PostCatalogue,
    config: &SolverConfig,
) {
    for unit in units {
        let unit_docs: Vec<&Doctor> = doctors.iter().filter(|d| d.unit == unit.name).collect();
        if unit_docs.is_empty() {
            continue;
        }
        let cap = (0.25 * unit_docs.len() as f64).ceil().max(1.0);

        for (s, day) in calendar.days.iter().enumerate() {
            if unit.runs_clinic_on(day.weekday) {
                continue;
            }
            let unit_vars: Vec<_> = unit_docs
                .iter()
                .flat_map(|d| catalogue.posts_for_weekday(day.weekday).iter().filter_map(move |t| vars.x_var(d.index, s, t)))
                .collect();
            if unit_vars.is_empty() {
                continue;
            }
            let over = model.new_continuous_var(format!("unit_over[{},{}]", unit.name, s));
            let mut expr = LinExpr::sum(unit_vars);
            expr.add_term(over, -1.0);
            model.add_constraint(format!("unit_cap[{},{}]", unit.name, s), expr, Relation::Le, cap);
            model.add_objective_term(over, config.lambda_unit_over);
        }
    }
}

/// Fallback objective: if no penalty terms were added anywhere above,
/// minimise the total number of assignments (spec §4.5 Objective).
fn finalize_objective(model: &mut Model, vars: &VariableSet, doctors: &[Doctor], calendar: &Calendar, catalogue: &PostCatalogue) {
    if !model.objective.is_empty() {
        return;
    }
    for doctor in doctors {
        for (s, day) in calendar.days.iter().enumerate() {
            for post in catalogue.posts_for_weekday(day.weekday) {
                if let Some(var) = vars.x_var(doctor.index, s, post) {
                    model.add_objective_term(var, 1.0);
                }
            }
        }
    }
}
