//! Domain model for the medical roster scheduling problem.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A doctor's clinical category. Drives several soft-penalty rules in
/// `constraints.rs` and the hard minimum-one-assignment rule for
/// non-floaters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Floater,
    Junior,
    Senior,
    Registrar,
}

/// Enriched workload history used by the workload-aware Standby penalty.
/// Defaults to all-zero / "never" when a doctor has no `workload_data`
/// record, matching the caller contract in spec §6.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Workload {
    #[serde(default)]
    pub weekday_oncalls_3m: u32,
    #[serde(default)]
    pub weekend_oncalls_3m: u32,
    #[serde(default)]
    pub ed_shifts_3m: u32,
    #[serde(default = "Workload::default_days_since_last_standby")]
    pub days_since_last_standby: u32,
    #[serde(default)]
    pub standby_count_12m: u32,
    #[serde(default)]
    pub standby_count_3m: u32,
}

impl Workload {
    fn default_days_since_last_standby() -> u32 {
        9999
    }
}

impl Default for Workload {
    fn default() -> Self {
        Self {
            weekday_oncalls_3m: 0,
            weekend_oncalls_3m: 0,
            ed_shifts_3m: 0,
            days_since_last_standby: Self::default_days_since_last_standby(),
            standby_count_12m: 0,
            standby_count_3m: 0,
        }
    }
}

/// A doctor who can be assigned to posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    /// Index of this doctor in `ScheduleRequest.doctors` for O(1) lookup.
    pub index: usize,
    pub id: String,
    pub name: String,
    pub unit: String,
    pub category: Category,
    #[serde(default)]
    pub last_standby: Option<NaiveDate>,
    #[serde(default)]
    pub workload: Workload,
}

impl Doctor {
    pub fn new(
        index: usize,
        id: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            index,
            id: id.into(),
            name: name.into(),
            unit: unit.into(),
            category,
            last_standby: None,
            workload: Workload::default(),
        }
    }

    pub fn with_workload(mut self, workload: Workload) -> Self {
        self.workload = workload;
        self
    }

    pub fn with_last_standby(mut self, date: NaiveDate) -> Self {
        self.last_standby = Some(date);
        self
    }

    pub fn is_floater(&self) -> bool {
        self.category == Category::Floater
    }
}

/// A unit (ward/department) with its own clinic-day schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
    /// Weekday numbers (0=Mon..6=Sun) on which this unit runs clinic.
    pub clinic_days: Vec<u8>,
}

impl Unit {
    pub fn runs_clinic_on(&self, weekday: u8) -> bool {
        self.clinic_days.contains(&weekday)
    }
}

/// The three syntactic post families, per spec §9 Design Note (tagged
/// variant over string-prefix matching). The wire form stays a plain
/// string everywhere outside this module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PostKind {
    Clinic(String),
    StandbyOncall,
    OnCall(String),
}

pub const STANDBY_ONCALL: &str = "Standby Oncall";
pub const CLINIC_PREFIX: &str = "clinic:";

impl PostKind {
    /// Parses a wire post name into its tagged family.
    pub fn parse(name: &str) -> Self {
        if let Some(unit) = name.strip_prefix(CLINIC_PREFIX) {
            PostKind::Clinic(unit.to_string())
        } else if name == STANDBY_ONCALL {
            PostKind::StandbyOncall
        } else {
            PostKind::OnCall(name.to_string())
        }
    }

    pub fn is_clinic(&self) -> bool {
        matches!(self, PostKind::Clinic(_))
    }

    /// Synthesises the wire-form name for a unit's clinic post.
    pub fn clinic_name(unit: &str) -> String {
        format!("{CLINIC_PREFIX}{unit}")
    }
}

/// A single availability record as supplied by the caller: explicit
/// records always win over the defaulting rules in `availability.rs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub doctor_id: String,
    pub date: NaiveDate,
    pub post: String,
    pub available: bool,
}

/// The immutable input to a single solve. Born once, lives for the
/// duration of one solve, discarded afterwards — no process-wide mutable
/// state beyond the external job registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub roster_start: NaiveDate,
    pub roster_end: NaiveDate,
    pub doctors: Vec<Doctor>,
    pub units: Vec<Unit>,
    pub posts_weekday: Vec<String>,
    pub posts_weekend: Vec<String>,
    #[serde(default)]
    pub availability: Vec<AvailabilityRecord>,
    #[serde(default)]
    pub solver_config: crate::config::SolverConfig,
}

impl ScheduleRequest {
    /// Index doctors by id for O(1) lookup during construction.
    pub fn doctor_index_by_id(&self) -> HashMap<&str, usize> {
        self.doctors.iter().map(|d| (d.id.as_str(), d.index)).collect()
    }
}
