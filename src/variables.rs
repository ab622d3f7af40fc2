//! C4 — Variable Builder: materialises decision variables `x[d,s,t]` only
//! where availability is true, plus the auxiliary variables the
//! Constraint Builder needs (weekend indicators, rest/gap indicators,
//! min-one slack). Coverage/clinic/unit-overage slacks are Phase-2-only
//! and materialised on demand by the Constraint Builder itself, since
//! their existence depends on which phase is being built.

use crate::availability::AvailabilityIndex;
use crate::calendar::Calendar;
use crate::catalogue::PostCatalogue;
use crate::domain::{Doctor, STANDBY_ONCALL};
use crate::model::{Model, VarId};
use std::collections::HashMap;

pub struct VariableSet {
    /// x[d,s,t]
    pub x: HashMap<(usize, usize, String), VarId>,
    /// y[d,w] — weekend Standby indicator.
    pub y: HashMap<(usize, usize), VarId>,
    /// rest_violation[d,s] for every adjacent (s, s+1).
    pub rest_violation: HashMap<(usize, usize), VarId>,
    /// z_gap[d,s] for every (s, s+2) in range.
    pub z_gap: HashMap<(usize, usize), VarId>,
    /// min_one_slack[d] for every non-floater.
    pub min_one_slack: HashMap<usize, VarId>,
    /// k[d] — multiple-Standby-weekend overflow penalty variable.
    pub multiple_weekend_penalty: HashMap<usize, VarId>,
}

impl VariableSet {
    pub fn build(
        model: &mut Model,
        doctors: &[Doctor],
        calendar: &Calendar,
        catalogue: &PostCatalogue,
        availability: &AvailabilityIndex,
    ) -> Self {
        let mut x = HashMap::new();
        for doctor in doctors {
            for (s, day) in calendar.days.iter().enumerate() {
                for post in catalogue.posts_for_weekday(day.weekday) {
                    if availability.is_available(doctor.index, s, post) {
                        let var = model.new_binary_var(format!("x[{},{},{}]", doctor.index, s, post));
                        x.insert((doctor.index, s, post.clone()), var);
                    }
                }
            }
        }

        let mut y = HashMap::new();
        for doctor in doctors {
            for (w, _) in calendar.weekend_pairs.iter().enumerate() {
                let var = model.new_binary_var(format!("y[{},{}]", doctor.index, w));
                y.insert((doctor.index, w), var);
            }
        }

        let mut rest_violation = HashMap::new();
        for doctor in doctors {
            for s in 0..calendar.len().saturating_sub(1) {
                let var = model.new_binary_var(format!("rest_violation[{},{}]", doctor.index, s));
                rest_violation.insert((doctor.index, s), var);
            }
        }

        let mut z_gap = HashMap::new();
        for doctor in doctors {
            if calendar.len() >= 3 {
                for s in 0..=(calendar.len() - 3) {
                    let var = model.new_binary_var(format!("z_gap[{},{}]", doctor.index, s));
                    z_gap.insert((doctor.index, s), var);
                }
            }
        }

        let mut min_one_slack = HashMap::new();
        for doctor in doctors {
            if !doctor.is_floater() {
                let var = model.new_binary_var(format!("min_one_slack[{}]", doctor.index));
                min_one_slack.insert(doctor.index, var);
            }
        }

        let mut multiple_weekend_penalty = HashMap::new();
        for doctor in doctors {
            let var = model.new_continuous_var(format!("k[{}]", doctor.index));
            multiple_weekend_penalty.insert(doctor.index, var);
        }

        Self {
            x,
            y,
            rest_violation,
            z_gap,
            min_one_slack,
            multiple_weekend_penalty,
        }
    }

    pub fn x_var(&self, doctor: usize, day: usize, post: &str) -> Option<VarId> {
        self.x.get(&(doctor, day, post.to_string())).copied()
    }

    pub fn standby_var(&self, doctor: usize, day: usize) -> Option<VarId> {
        self.x_var(doctor, day, STANDBY_ONCALL)
    }
}
