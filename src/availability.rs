//! C3 — Availability Index: sparse lookup `(doctor, day, post) -> bool`,
//! default false except for clinic-post auto-availability; diagnoses
//! uncoverable `(doctor, day, post)` slots before variable materialisation.

use crate::calendar::Calendar;
use crate::catalogue::PostCatalogue;
use crate::domain::{AvailabilityRecord, Doctor, PostKind, Unit};
use std::collections::{HashMap, HashSet};

/// Eager, fully-materialised `(doctor_idx, day_idx, post) -> bool` table.
/// Built once per solve: explicit records win, everything else defaults to
/// false except clinic posts for unit members on clinic weekdays.
pub struct AvailabilityIndex {
    table: HashMap<(usize, usize, String), bool>,
    /// Posts with zero eligible doctors, found while defaulting — surfaced
    /// as `Warning::UncoverableSlot` by the reporter.
    pub uncoverable: Vec<(usize, String)>,
}

impl AvailabilityIndex {
    pub fn build(
        doctors: &[Doctor],
        units: &[Unit],
        calendar: &Calendar,
        catalogue: &PostCatalogue,
        records: &[AvailabilityRecord],
    ) -> Self {
        let unit_by_name: HashMap<&str, &Unit> = units.iter().map(|u| (u.name.as_str(), u)).collect();
        let mut table: HashMap<(usize, usize, String), bool> = HashMap::new();

        // Explicit records win.
        let date_to_idx: HashMap<_, _> = calendar.days.iter().enumerate().map(|(i, d)| (d.date, i)).collect();
        let id_to_idx: HashMap<&str, usize> = doctors.iter().map(|d| (d.id.as_str(), d.index)).collect();
        for rec in records {
            if let (Some(&s), Some(&d)) = (date_to_idx.get(&rec.date), id_to_idx.get(rec.doctor_id.as_str())) {
                table.insert((d, s, rec.post.clone()), rec.available);
            }
        }

        // Default everything else, with clinic auto-availability.
        for doctor in doctors {
            for (s, day) in calendar.days.iter().enumerate() {
                for post in catalogue.posts_for_weekday(day.weekday) {
                    let key = (doctor.index, s, post.clone());
                    if table.contains_key(&key) {
                        continue;
                    }
                    let default_value = match PostKind::parse(post) {
                        PostKind::Clinic(unit_name) => {
                            let same_unit = doctor.unit == unit_name;
                            let clinic_day = unit_by_name
                                .get(unit_name.as_str())
                                .map(|u| u.runs_clinic_on(day.weekday))
                                .unwrap_or(false);
                            same_unit && clinic_day
                        }
                        _ => false,
                    };
                    table.insert(key, default_value);
                }
            }
        }

        // Diagnose uncoverable (s,t) slots: zero eligible doctors.
        let mut uncoverable = Vec::new();
        for (s, day) in calendar.days.iter().enumerate() {
            for post in catalogue.posts_for_weekday(day.weekday) {
                let any_eligible = doctors
                    .iter()
                    .any(|d| table.get(&(d.index, s, post.clone())).copied().unwrap_or(false));
                if !any_eligible {
                    uncoverable.push((s, post.clone()));
                }
            }
        }

        Self { table, uncoverable }
    }

    pub fn is_available(&self, doctor_idx: usize, day_idx: usize, post: &str) -> bool {
        self.table
            .get(&(doctor_idx, day_idx, post.to_string()))
            .copied()
            .unwrap_or(false)
    }

    /// Post-availability breakdown: `post -> (available_count, total_count)`,
    /// used by the reporter. Matches `prime_scheduler_wrapper.py` lines
    /// 214-225.
    pub fn breakdown_by_post(&self) -> HashMap<String, (usize, usize)> {
        let mut out: HashMap<String, (usize, usize)> = HashMap::new();
        for ((_, _, post), available) in &self.table {
            let entry = out.entry(post.clone()).or_insert((0, 0));
            entry.1 += 1;
            if *available {
                entry.0 += 1;
            }
        }
        out
    }

    pub fn eligible_doctors(&self, doctors: &[Doctor], day_idx: usize, post: &str) -> HashSet<usize> {
        doctors
            .iter()
            .filter(|d| self.is_available(d.index, day_idx, post))
            .map(|d| d.index)
            .collect()
    }
}
