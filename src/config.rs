//! Solver configuration — the `solver_config{}` request field (spec §6).
//!
//! Every key is optional on the wire; missing keys fall back to the
//! defaults in the spec's table via per-field `serde(default = ...)`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    #[serde(default = "SolverConfig::default_clinic_before")]
    pub clinic_penalty_before: f64,
    #[serde(default = "SolverConfig::default_clinic_same")]
    pub clinic_penalty_same: f64,
    #[serde(default = "SolverConfig::default_clinic_after")]
    pub clinic_penalty_after: f64,
    #[serde(default = "SolverConfig::default_lambda_rest")]
    pub lambda_rest: f64,
    #[serde(default = "SolverConfig::default_lambda_gap")]
    pub lambda_gap: f64,
    #[serde(default = "SolverConfig::default_lambda_ed")]
    pub lambda_ed: f64,
    #[serde(default = "SolverConfig::default_lambda_standby")]
    pub lambda_standby: f64,
    #[serde(default = "SolverConfig::default_lambda_min_one")]
    pub lambda_min_one: f64,
    #[serde(default = "SolverConfig::default_lambda_reg_weekend")]
    pub lambda_reg_weekend: f64,
    #[serde(default = "SolverConfig::default_lambda_unit_over")]
    pub lambda_unit_over: f64,
    #[serde(default = "SolverConfig::default_lambda_junior_ward")]
    pub lambda_junior_ward: f64,
    #[serde(default = "SolverConfig::default_big_m")]
    pub big_m: f64,
    #[serde(default = "SolverConfig::default_solver_timeout_seconds")]
    pub solver_timeout_seconds: u64,
}

impl SolverConfig {
    fn default_clinic_before() -> f64 {
        10.0
    }
    fn default_clinic_same() -> f64 {
        50.0
    }
    fn default_clinic_after() -> f64 {
        5.0
    }
    fn default_lambda_rest() -> f64 {
        3.0
    }
    fn default_lambda_gap() -> f64 {
        1.0
    }
    fn default_lambda_ed() -> f64 {
        6.0
    }
    fn default_lambda_standby() -> f64 {
        5.0
    }
    fn default_lambda_min_one() -> f64 {
        10.0
    }
    fn default_lambda_reg_weekend() -> f64 {
        2.0
    }
    fn default_lambda_unit_over() -> f64 {
        25.0
    }
    fn default_lambda_junior_ward() -> f64 {
        6.0
    }
    fn default_big_m() -> f64 {
        10000.0
    }
    fn default_solver_timeout_seconds() -> u64 {
        600
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            clinic_penalty_before: Self::default_clinic_before(),
            clinic_penalty_same: Self::default_clinic_same(),
            clinic_penalty_after: Self::default_clinic_after(),
            lambda_rest: Self::default_lambda_rest(),
            lambda_gap: Self::default_lambda_gap(),
            lambda_ed: Self::default_lambda_ed(),
            lambda_standby: Self::default_lambda_standby(),
            lambda_min_one: Self::default_lambda_min_one(),
            lambda_reg_weekend: Self::default_lambda_reg_weekend(),
            lambda_unit_over: Self::default_lambda_unit_over(),
            lambda_junior_ward: Self::default_lambda_junior_ward(),
            big_m: Self::default_big_m(),
            solver_timeout_seconds: Self::default_solver_timeout_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = SolverConfig::default();
        assert_eq!(cfg.clinic_penalty_before, 10.0);
        assert_eq!(cfg.clinic_penalty_same, 50.0);
        assert_eq!(cfg.clinic_penalty_after, 5.0);
        assert_eq!(cfg.lambda_rest, 3.0);
        assert_eq!(cfg.lambda_gap, 1.0);
        assert_eq!(cfg.lambda_ed, 6.0);
        assert_eq!(cfg.lambda_standby, 5.0);
        assert_eq!(cfg.lambda_min_one, 10.0);
        assert_eq!(cfg.lambda_reg_weekend, 2.0);
        assert_eq!(cfg.lambda_unit_over, 25.0);
        assert_eq!(cfg.lambda_junior_ward, 6.0);
        assert_eq!(cfg.big_m, 10000.0);
        assert_eq!(cfg.solver_timeout_seconds, 600);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg: SolverConfig = serde_json::from_str(r#"{"lambdaRest": 7}"#).unwrap();
        assert_eq!(cfg.lambda_rest, 7.0);
        assert_eq!(cfg.lambda_gap, 1.0);
    }
}
