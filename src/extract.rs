//! C7 — Result Extractor: thresholds the oracle's variable values at 0.5
//! and turns the surviving `x[d,s,t]` variables into assignment rows plus
//! the statistics block of spec §6 (`total_assignments`, `doctors_used`,
//! `posts_filled`, `assignments_by_date`, `workload_by_doctor`,
//! `eligible_unassigned_doctors`).
//! Grounded on `prime_scheduler_wrapper.py` lines 560-610 (`extract_solution`).

use crate::calendar::Calendar;
use crate::domain::Doctor;
use crate::variables::VariableSet;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentRow {
    pub doctor_id: String,
    pub doctor_name: String,
    pub date: NaiveDate,
    pub post: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    pub total_assignments: usize,
    pub doctors_used: usize,
    /// Count of assignment rows per post name, matching the Python
    /// `posts_filled[post] += 1` breakdown.
    pub posts_filled: HashMap<String, usize>,
    pub assignments_by_date: HashMap<NaiveDate, usize>,
    pub workload_by_doctor: HashMap<String, usize>,
    /// Doctors who have at least one materialised `x[d,s,t]` variable
    /// (i.e. were eligible for something) but ended up with zero
    /// assignments in the adopted solution. Diagnostic only, grounded on
    /// `prime_scheduler_wrapper.py` lines 652-658's `not_assigned` list.
    pub eligible_unassigned_doctors: Vec<String>,
}

const ASSIGNMENT_THRESHOLD: f64 = 0.5;

pub fn extract(values: &[f64], doctors: &[Doctor], calendar: &Calendar, vars: &VariableSet) -> (Vec<AssignmentRow>, Statistics) {
    let mut rows = Vec::new();
    let doctor_by_index: HashMap<usize, &Doctor> = doctors.iter().map(|d| (d.index, d)).collect();

    let mut keys: Vec<_> = vars.x.keys().cloned().collect();
    keys.sort_by(|a, b| (a.1, &a.2, a.0).cmp(&(b.1, &b.2, b.0)));

    for (doctor_idx, day_idx, post) in keys {
        let var = vars.x[&(doctor_idx, day_idx, post.clone())];
        if values[var] > ASSIGNMENT_THRESHOLD {
            let doctor = doctor_by_index[&doctor_idx];
            rows.push(AssignmentRow {
                doctor_id: doctor.id.clone(),
                doctor_name: doctor.name.clone(),
                date: calendar.days[day_idx].date,
                post,
            });
        }
    }

    let stats = statistics(&rows, doctors, vars);
    (rows, stats)
}

fn statistics(rows: &[AssignmentRow], doctors: &[Doctor], vars: &VariableSet) -> Statistics {
    let mut assignments_by_date: HashMap<NaiveDate, usize> = HashMap::new();
    let mut workload_by_doctor: HashMap<String, usize> = HashMap::new();
    let mut posts_filled: HashMap<String, usize> = HashMap::new();
    let mut doctors_used: HashSet<&str> = HashSet::new();

    for row in rows {
        *assignments_by_date.entry(row.date).or_insert(0) += 1;
        *workload_by_doctor.entry(row.doctor_id.clone()).or_insert(0) += 1;
        *posts_filled.entry(row.post.clone()).or_insert(0) += 1;
        doctors_used.insert(&row.doctor_id);
    }

    // Doctors with zero assignments still appear with a zero count, so the
    // caller can distinguish "never used" from "not a valid id".
    for doctor in doctors {
        workload_by_doctor.entry(doctor.id.clone()).or_insert(0);
    }

    let eligible_doctor_indices: HashSet<usize> = vars.x.keys().map(|(doctor_idx, _, _)| *doctor_idx).collect();
    let mut eligible_unassigned_doctors: Vec<String> = doctors
        .iter()
        .filter(|d| eligible_doctor_indices.contains(&d.index) && !doctors_used.contains(d.id.as_str()))
        .map(|d| d.id.clone())
        .collect();
    eligible_unassigned_doctors.sort();

    Statistics {
        total_assignments: rows.len(),
        doctors_used: doctors_used.len(),
        posts_filled,
        assignments_by_date,
        workload_by_doctor,
        eligible_unassigned_doctors,
    }
}
