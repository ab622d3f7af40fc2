//! The linear-model IR shared by the Variable Builder (C4) and Constraint
//! Builder (C5). This is new code: no MIP-builder crate appears anywhere in
//! the example corpus, so the model the engine hands to a
//! [`crate::oracle::SolverOracle`] is represented explicitly here instead
//! of via a third-party LP/MIP DSL. See DESIGN.md for the grounding note.

use std::fmt;

pub type VarId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// A 0/1 decision or indicator variable.
    Binary,
    /// A non-negative continuous slack variable.
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relation::Eq => "=",
            Relation::Le => "<=",
            Relation::Ge => ">=",
        };
        write!(f, "{s}")
    }
}

/// A sparse linear expression: `sum(coeff * var) `. No implicit constant —
/// every constraint in this engine compares an expression to a bare RHS.
#[derive(Debug, Clone, Default)]
pub struct LinExpr {
    pub terms: Vec<(VarId, f64)>,
}

impl LinExpr {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    pub fn single(var: VarId, coeff: f64) -> Self {
        Self { terms: vec![(var, coeff)] }
    }

    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
        }
    }

    pub fn add_term(&mut self, var: VarId, coeff: f64) {
        self.terms.push((var, coeff));
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|&(v, c)| c * values[v]).sum()
    }
}

pub struct Constraint {
    pub label: String,
    pub expr: LinExpr,
    pub relation: Relation,
    pub rhs: f64,
}

/// A sparse 0/1 MIP with a small number of continuous slack variables,
/// built incrementally by the Variable/Constraint builders and handed,
/// read-only, to a [`crate::oracle::SolverOracle`].
#[derive(Default)]
pub struct Model {
    var_kinds: Vec<VarKind>,
    var_labels: Vec<String>,
    pub constraints: Vec<Constraint>,
    pub objective: LinExpr,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_binary_var(&mut self, label: impl Into<String>) -> VarId {
        let id = self.var_kinds.len();
        self.var_kinds.push(VarKind::Binary);
        self.var_labels.push(label.into());
        id
    }

    pub fn new_continuous_var(&mut self, label: impl Into<String>) -> VarId {
        let id = self.var_kinds.len();
        self.var_kinds.push(VarKind::Continuous);
        self.var_labels.push(label.into());
        id
    }

    pub fn add_constraint(&mut self, label: impl Into<String>, expr: LinExpr, relation: Relation, rhs: f64) {
        if expr.is_empty() {
            return;
        }
        self.constraints.push(Constraint {
            label: label.into(),
            expr,
            relation,
            rhs,
        });
    }

    pub fn add_objective_term(&mut self, var: VarId, coeff: f64) {
        if coeff != 0.0 {
            self.objective.add_term(var, coeff);
        }
    }

    pub fn num_vars(&self) -> usize {
        self.var_kinds.len()
    }

    pub fn kind(&self, var: VarId) -> VarKind {
        self.var_kinds[var]
    }

    pub fn label(&self, var: VarId) -> &str {
        &self.var_labels[var]
    }

    pub fn binary_vars(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.var_kinds.len()).filter(move |&v| self.var_kinds[v] == VarKind::Binary)
    }

    /// Constraints that reference the given variable, for incremental
    /// propagation during branch-and-bound.
    pub fn constraints_touching(&self, var: VarId) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.expr.terms.iter().any(|&(v, _)| v == var))
    }
}
