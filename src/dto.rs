//! Wire DTOs for the REST API (spec §6). Field-for-field mirror of the
//! Python Pydantic request/response models in `main.py`: top-level and
//! domain fields stay snake_case on the wire (`roster_start`,
//! `doctor_id`, ...), while `solver_config{}` keys are camelCase, matching
//! the split already encoded in [`crate::config::SolverConfig`]. Grounded
//! on the teacher's `EmployeeDto`/`ScheduleDto` From/to_domain pattern.

use crate::calendar::Calendar;
use crate::config::SolverConfig;
use crate::domain::{AvailabilityRecord, Category, Doctor, ScheduleRequest, Unit, Workload};
use crate::extract::Statistics;
use crate::oracle::SolverStatus;
use crate::report::{Report, Warning};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorDto {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub category: Category,
    #[serde(default)]
    pub last_standby: Option<NaiveDate>,
    #[serde(default)]
    pub workload: Workload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDto {
    pub id: String,
    pub name: String,
    pub clinic_days: Vec<u8>,
}

/// Separate enriched-history payload, keyed by `doctor_id`; when present
/// for a doctor it replaces that doctor's inline `workload{}` wholesale —
/// this is the up-to-date source, the inline value is only a fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadDataDto {
    pub doctor_id: String,
    #[serde(flatten)]
    pub workload: Workload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequestDto {
    pub roster_start: NaiveDate,
    pub roster_end: NaiveDate,
    pub doctors: Vec<DoctorDto>,
    pub units: Vec<UnitDto>,
    pub posts_weekday: Vec<String>,
    pub posts_weekend: Vec<String>,
    #[serde(default)]
    pub availability: Vec<AvailabilityRecord>,
    #[serde(default)]
    pub workload_data: Vec<WorkloadDataDto>,
    #[serde(default)]
    pub solver_config: SolverConfig,
}

impl ScheduleRequestDto {
    pub fn into_domain(self) -> ScheduleRequest {
        let overrides: HashMap<String, Workload> = self.workload_data.into_iter().map(|w| (w.doctor_id, w.workload)).collect();

        let doctors: Vec<Doctor> = self
            .doctors
            .into_iter()
            .enumerate()
            .map(|(index, dto)| {
                let workload = overrides.get(&dto.id).copied().unwrap_or(dto.workload);
                let mut doctor = Doctor::new(index, dto.id, dto.name, dto.unit, dto.category).with_workload(workload);
                if let Some(date) = dto.last_standby {
                    doctor = doctor.with_last_standby(date);
                }
                doctor
            })
            .collect();

        let units: Vec<Unit> = self.units.into_iter().map(|u| Unit { id: u.id, name: u.name, clinic_days: u.clinic_days }).collect();

        ScheduleRequest {
            roster_start: self.roster_start,
            roster_end: self.roster_end,
            doctors,
            units,
            posts_weekday: self.posts_weekday,
            posts_weekend: self.posts_weekend,
            availability: self.availability,
            solver_config: self.solver_config,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentDto {
    pub doctor: String,
    pub date: NaiveDate,
    pub post: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponseDto {
    pub schedule: Vec<AssignmentDto>,
    pub statistics: Statistics,
    pub solver_status: SolverStatus,
    pub objective_value: Option<f64>,
    pub success: bool,
    pub warnings: Vec<String>,
    pub weekend_assignments: usize,
}

impl ScheduleResponseDto {
    pub fn from_report(report: &Report, calendar: &Calendar) -> Self {
        let success = matches!(report.status, SolverStatus::Optimal | SolverStatus::OptimalInaccurate);

        let day_by_date: HashMap<NaiveDate, usize> = calendar.days.iter().enumerate().map(|(i, d)| (d.date, i)).collect();
        let weekend_assignments = report
            .assignments
            .iter()
            .filter(|a| day_by_date.get(&a.date).map(|&s| calendar.days[s].is_weekend()).unwrap_or(false))
            .count();

        let schedule = report
            .assignments
            .iter()
            .map(|a| AssignmentDto { doctor: a.doctor_id.clone(), date: a.date, post: a.post.clone() })
            .collect();

        let warnings = report.warnings.iter().map(describe_warning).collect();

        Self {
            schedule,
            statistics: report.statistics.clone(),
            solver_status: report.status,
            objective_value: success.then_some(report.objective_value),
            success,
            warnings,
            weekend_assignments,
        }
    }
}

fn describe_warning(warning: &Warning) -> String {
    match warning {
        Warning::UncoverableSlot { day_index, post } => format!("no eligible doctor for post {post} on day index {day_index}"),
        Warning::CoverageRelaxed => "phase 1 coverage infeasible; big-M relaxation was used".to_string(),
        Warning::WeekendPairingInfeasible { weekend_index } => {
            format!("weekend pair {weekend_index}: no doctor is eligible for Standby Oncall on both Saturday and Sunday")
        }
        Warning::UnrecognisedPostPrefix { post } => {
            format!("post {post} matches no Ward*/ED*/Registrar* prefix convention; category penalties never apply to it")
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusDto {
    pub job_id: String,
    pub status: JobState,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub result: Option<ScheduleResponseDto>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponseDto {
    pub job_id: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponseDto {
    pub status: &'static str,
}
