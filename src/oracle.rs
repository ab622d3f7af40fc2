//! C6a — Solver Oracle: the pluggable MIP-solving boundary. Spec §4.6
//! treats the underlying solver as an out-of-scope black box; this module
//! defines that boundary as a trait and ships one reference
//! implementation (`BranchAndBoundOracle`) so the engine is usable
//! stand-alone. No MIP/LP solver crate exists anywhere in the retrieved
//! corpus, so the reference oracle is original code — grounded on the
//! shape of CBC's solve loop in `prime_scheduler_wrapper.py` (binary
//! branching, incumbent tracking, bound pruning) but implemented from
//! scratch in safe Rust.

use crate::model::{Model, VarKind};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    Optimal,
    /// A feasible incumbent was found but the search did not prove
    /// optimality before the timeout — still usable, per spec §7.
    OptimalInaccurate,
    Infeasible,
    TimedOut,
}

pub struct OracleOutcome {
    pub status: SolverStatus,
    /// Values for every variable in the model, indexed by `VarId`. Empty
    /// when `status == Infeasible`.
    pub values: Vec<f64>,
    pub objective_value: f64,
}

/// The solver boundary the engine depends on. A production deployment can
/// swap in a real MIP backend by implementing this trait; `solve.rs`
/// never depends on `BranchAndBoundOracle` directly.
pub trait SolverOracle {
    fn solve(&self, model: &Model, timeout: Duration) -> OracleOutcome;
}

/// Depth-first binary branch-and-bound over the model's binary variables,
/// with continuous slack/reward variables resolved in closed form once
/// the binaries are fixed (every continuous variable in this engine is
/// box-separable with a nonnegative objective coefficient or enters only
/// as a `<=` slack, so its optimal value given fixed binaries is a direct
/// formula, not a sub-LP).
pub struct BranchAndBoundOracle {
    pub node_limit: usize,
}

impl Default for BranchAndBoundOracle {
    fn default() -> Self {
        Self { node_limit: 200_000 }
    }
}

struct SearchState<'m> {
    model: &'m Model,
    binary_vars: Vec<usize>,
    deadline: Instant,
    nodes_visited: usize,
    node_limit: usize,
    best_objective: f64,
    best_assignment: Option<Vec<f64>>,
    timed_out: bool,
}

impl SolverOracle for BranchAndBoundOracle {
    fn solve(&self, model: &Model, timeout: Duration) -> OracleOutcome {
        let binary_vars: Vec<usize> = model.binary_vars().collect();
        let mut assignment = vec![f64::NAN; model.num_vars()];

        let mut state = SearchState {
            model,
            binary_vars: binary_vars.clone(),
            deadline: Instant::now() + timeout,
            nodes_visited: 0,
            node_limit: self.node_limit,
            best_objective: f64::INFINITY,
            best_assignment: None,
            timed_out: false,
        };

        branch(&mut state, &mut assignment, 0);

        match state.best_assignment {
            Some(values) => {
                let status = if state.timed_out || state.nodes_visited >= state.node_limit {
                    SolverStatus::OptimalInaccurate
                } else {
                    SolverStatus::Optimal
                };
                OracleOutcome {
                    status,
                    objective_value: state.best_objective,
                    values,
                }
            }
            None => {
                let status = if state.timed_out {
                    SolverStatus::TimedOut
                } else {
                    SolverStatus::Infeasible
                };
                OracleOutcome { status, values: Vec::new(), objective_value: f64::INFINITY }
            }
        }
    }
}

fn branch(state: &mut SearchState, assignment: &mut [f64], depth: usize) {
    if state.timed_out {
        return;
    }
    if Instant::now() >= state.deadline {
        state.timed_out = true;
        return;
    }
    state.nodes_visited += 1;
    if state.nodes_visited > state.node_limit {
        state.timed_out = true;
        return;
    }

    if depth == state.binary_vars.len() {
        resolve_continuous(state.model, assignment);
        if !satisfies_all(state.model, assignment) {
            return;
        }
        let objective = state.model.objective.evaluate(assignment);
        if objective < state.best_objective {
            state.best_objective = objective;
            state.best_assignment = Some(assignment.to_vec());
        }
        return;
    }

    let var = state.binary_vars[depth];
    // Try 0 before 1: favours sparser assignments, consistent with
    // preferring the empty roster when the objective is indifferent.
    for &value in &[0.0, 1.0] {
        assignment[var] = value;
        if partial_feasible(state.model, assignment, depth, &state.binary_vars) {
            branch(state, assignment, depth + 1);
            if state.timed_out {
                return;
            }
        }
    }
    assignment[var] = f64::NAN;
}

/// Cheap partial-feasibility check: any constraint whose every term is
/// already fixed (all touching binaries assigned, continuous terms
/// ignored) is checked eagerly to prune early.
fn partial_feasible(model: &Model, assignment: &[f64], depth: usize, binary_vars: &[usize]) -> bool {
    let fixed: std::collections::HashSet<usize> = binary_vars[..=depth].iter().copied().collect();
    for constraint in &model.constraints {
        let all_fixed = constraint.expr.terms.iter().all(|&(v, _)| {
            model.kind(v) == VarKind::Continuous || fixed.contains(&v)
        });
        if !all_fixed {
            continue;
        }
        let lhs: f64 = constraint
            .expr
            .terms
            .iter()
            .map(|&(v, c)| {
                if model.kind(v) == VarKind::Continuous {
                    0.0 // slack can still absorb slack on the `>=`/`<=` side
                } else {
                    c * assignment[v]
                }
            })
            .sum();
        let has_continuous = constraint.expr.terms.iter().any(|&(v, _)| model.kind(v) == VarKind::Continuous);
        if has_continuous {
            continue; // deferred to the full check once slacks are resolved
        }
        let ok = match constraint.relation {
            crate::model::Relation::Eq => (lhs - constraint.rhs).abs() < 1e-6,
            crate::model::Relation::Le => lhs <= constraint.rhs + 1e-6,
            crate::model::Relation::Ge => lhs >= constraint.rhs - 1e-6,
        };
        if !ok {
            return false;
        }
    }
    true
}

/// Resolves every continuous slack to its minimal feasible value given
/// the fixed binaries. Every continuous variable in this engine appears
/// with a nonnegative objective coefficient and only needs to absorb a
/// `>=` shortfall or a `<=` overflow, so the closed form is
/// `max(0, rhs - binary_lhs)` (coverage/clinic slack) or
/// `max(0, binary_lhs - rhs)` (overflow/over-coverage), independent of
/// the other continuous variables.
fn resolve_continuous(model: &Model, assignment: &mut [f64]) {
    for (var, kind) in (0..model.num_vars()).map(|v| (v, model.kind(v))) {
        if kind != VarKind::Continuous {
            continue;
        }
        let mut lower_bound = 0.0f64;
        for constraint in model.constraints_touching(var) {
            let coeff = constraint.expr.terms.iter().find(|&&(v, _)| v == var).unwrap().1;
            let binary_lhs: f64 = constraint
                .expr
                .terms
                .iter()
                .filter(|&&(v, _)| v != var)
                .map(|&(v, c)| c * assignment[v])
                .sum();
            let required = match constraint.relation {
                crate::model::Relation::Ge => (constraint.rhs - binary_lhs) / coeff.max(1e-9),
                // `coeff` is negative here (the slack subtracts from the
                // binary sum, e.g. `sum(x) - over <= cap`), so dividing by
                // the clamped-positive `coeff.max(1e-9)` used in the `Ge`
                // arm would flip the sign and blow the shortfall up by
                // ~1e9. Keep `coeff` signed.
                crate::model::Relation::Le => (constraint.rhs - binary_lhs) / coeff,
                crate::model::Relation::Eq => 0.0,
            };
            lower_bound = lower_bound.max(required);
        }
        assignment[var] = lower_bound.max(0.0);
    }
}

fn satisfies_all(model: &Model, assignment: &[f64]) -> bool {
    model.constraints.iter().all(|c| {
        let lhs = c.expr.evaluate(assignment);
        match c.relation {
            crate::model::Relation::Eq => (lhs - c.rhs).abs() < 1e-6,
            crate::model::Relation::Le => lhs <= c.rhs + 1e-6,
            crate::model::Relation::Ge => lhs >= c.rhs - 1e-6,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinExpr;

    #[test]
    fn trivially_satisfiable_model_solves_to_optimal() {
        let mut model = Model::new();
        let x = model.new_binary_var("x");
        model.add_constraint("x_eq_1", LinExpr::single(x, 1.0), crate::model::Relation::Eq, 1.0);
        model.add_objective_term(x, 1.0);

        let oracle = BranchAndBoundOracle::default();
        let outcome = oracle.solve(&model, Duration::from_secs(5));
        assert_eq!(outcome.status, SolverStatus::Optimal);
        assert_eq!(outcome.values[x], 1.0);
    }

    #[test]
    fn contradictory_model_is_infeasible() {
        let mut model = Model::new();
        let x = model.new_binary_var("x");
        model.add_constraint("x_eq_1", LinExpr::single(x, 1.0), crate::model::Relation::Eq, 1.0);
        model.add_constraint("x_eq_0", LinExpr::single(x, 1.0), crate::model::Relation::Eq, 0.0);

        let oracle = BranchAndBoundOracle::default();
        let outcome = oracle.solve(&model, Duration::from_secs(5));
        assert_eq!(outcome.status, SolverStatus::Infeasible);
    }

    #[test]
    fn coverage_slack_resolves_to_shortfall_when_unavoidable() {
        let mut model = Model::new();
        let slack = model.new_continuous_var("slack");
        let mut expr = LinExpr::new();
        expr.add_term(slack, 1.0);
        model.add_constraint("cov", expr, crate::model::Relation::Ge, 1.0);
        model.add_objective_term(slack, 10.0);

        let oracle = BranchAndBoundOracle::default();
        let outcome = oracle.solve(&model, Duration::from_secs(5));
        assert_eq!(outcome.status, SolverStatus::Optimal);
        assert_eq!(outcome.values[slack], 1.0);
    }
}
