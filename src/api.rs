//! REST API surface (spec §6 HTTP surface, §5 concurrency model). Thin
//! axum router over a job registry: `POST /schedule/generate` enqueues a
//! solve and returns a job id immediately; the job body runs on a blocking
//! task and is the only writer of its own status record, mirroring the
//! teacher's `AppState { jobs: RwLock<HashMap<..>> }` + `tokio::spawn`
//! pattern (`api.rs`'s original `create_schedule`/`SolveJob`). The
//! teacher's `rayon::spawn` CPU-offload is replaced with
//! `tokio::task::spawn_blocking` since the new engine's CPU-bound stage is
//! one branch-and-bound call rather than a rayon-parallel local search —
//! see DESIGN.md "Dropped teacher dependencies".

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::availability::AvailabilityIndex;
use crate::calendar::Calendar;
use crate::catalogue::PostCatalogue;
use crate::domain::ScheduleRequest;
use crate::dto::{GenerateResponseDto, HealthResponseDto, JobState, JobStatusDto, ScheduleRequestDto, ScheduleResponseDto};
use crate::error::EngineResult;
use crate::oracle::BranchAndBoundOracle;
use crate::solve;

struct Job {
    state: JobState,
    submitted_at: chrono::DateTime<Utc>,
    started_at: Option<chrono::DateTime<Utc>>,
    finished_at: Option<chrono::DateTime<Utc>>,
    result: Option<ScheduleResponseDto>,
    error: Option<String>,
    /// Set by the cancel endpoint; observed by the worker once it
    /// finishes, per spec §5 ("cannot be preempted from outside").
    cancel_requested: bool,
}

/// Application state shared across handlers.
pub struct AppState {
    jobs: RwLock<HashMap<String, Job>>,
}

impl AppState {
    pub fn new() -> Self {
        Self { jobs: RwLock::new(HashMap::new()) }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/schedule/generate", post(generate))
        .route("/schedule/status/{id}", get(status))
        .route("/schedule/{id}", delete(cancel))
        .route("/schedule/jobs", get(list_jobs))
        .with_state(state)
}

async fn health() -> Json<HealthResponseDto> {
    Json(HealthResponseDto { status: "UP" })
}

async fn generate(State(state): State<Arc<AppState>>, Json(dto): Json<ScheduleRequestDto>) -> Result<Json<GenerateResponseDto>, StatusCode> {
    let id = Uuid::new_v4().to_string();

    {
        let mut jobs = state.jobs.write();
        jobs.insert(
            id.clone(),
            Job {
                state: JobState::Queued,
                submitted_at: Utc::now(),
                started_at: None,
                finished_at: None,
                result: None,
                error: None,
                cancel_requested: false,
            },
        );
    }

    let job_id = id.clone();
    let state_clone = state.clone();
    tokio::spawn(async move {
        {
            let mut jobs = state_clone.jobs.write();
            if let Some(job) = jobs.get_mut(&job_id) {
                job.state = JobState::Running;
                job.started_at = Some(Utc::now());
            }
        }

        let request = dto.into_domain();
        let outcome = tokio::task::spawn_blocking(move || execute(request)).await;

        let mut jobs = state_clone.jobs.write();
        let Some(job) = jobs.get_mut(&job_id) else { return };

        if job.cancel_requested {
            job.state = JobState::Cancelled;
            job.finished_at = Some(Utc::now());
            return;
        }

        job.finished_at = Some(Utc::now());
        match outcome {
            Ok(Ok(response)) => {
                job.state = JobState::Completed;
                job.result = Some(response);
            }
            Ok(Err(e)) => {
                job.state = JobState::Failed;
                job.error = Some(e.to_string());
            }
            Err(join_err) => {
                job.state = JobState::Failed;
                job.error = Some(format!("solver task panicked: {join_err}"));
            }
        }
    });

    Ok(Json(GenerateResponseDto { job_id: id }))
}

async fn status(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<JobStatusDto>, StatusCode> {
    let jobs = state.jobs.read();
    let job = jobs.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(job_status_dto(&id, job, true)))
}

async fn cancel(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> StatusCode {
    let mut jobs = state.jobs.write();
    match jobs.get_mut(&id) {
        Some(job) => {
            job.cancel_requested = true;
            if job.state == JobState::Queued {
                job.state = JobState::Cancelled;
                job.finished_at = Some(Utc::now());
            }
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn list_jobs(State(state): State<Arc<AppState>>) -> Json<Vec<JobStatusDto>> {
    let jobs = state.jobs.read();
    let mut summaries: Vec<JobStatusDto> = jobs.iter().map(|(id, job)| job_status_dto(id, job, false)).collect();
    summaries.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
    Json(summaries)
}

fn job_status_dto(id: &str, job: &Job, include_result: bool) -> JobStatusDto {
    JobStatusDto {
        job_id: id.to_string(),
        status: job.state,
        submitted_at: job.submitted_at,
        started_at: job.started_at,
        finished_at: job.finished_at,
        result: if include_result { job.result.clone() } else { None },
        error: job.error.clone(),
    }
}

/// Runs one full solve synchronously: calendar/catalogue/availability
/// construction, the two-phase solve, and report assembly. The only
/// blocking stage is the oracle invocation inside `solve::solve`.
fn execute(request: ScheduleRequest) -> EngineResult<ScheduleResponseDto> {
    let calendar = Calendar::build(request.roster_start, request.roster_end)?;
    let catalogue = PostCatalogue::build(&request.posts_weekday, &request.posts_weekend, &request.units);
    let availability = AvailabilityIndex::build(&request.doctors, &request.units, &calendar, &catalogue, &request.availability);

    let oracle = BranchAndBoundOracle::default();
    let solve_result = solve::solve(&oracle, &request.doctors, &request.units, &calendar, &catalogue, &availability, &request.solver_config)?;

    let report = crate::report::build(solve_result, &request.doctors, &calendar, &catalogue, &availability);
    Ok(ScheduleResponseDto::from_report(&report, &calendar))
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    fn minimal_request_json() -> serde_json::Value {
        serde_json::json!({
            "roster_start": "2025-08-04",
            "roster_end": "2025-08-04",
            "doctors": [{"id": "d1", "name": "Doc One", "unit": "U1", "category": "senior"}],
            "units": [],
            "posts_weekday": ["ED1"],
            "posts_weekend": []
        })
    }

    #[tokio::test]
    async fn health_check_returns_up() {
        let state = Arc::new(AppState::new());
        let app = router(state);
        let response = app
            .oneshot(axum::http::Request::builder().uri("/health").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn generate_then_poll_status_reaches_terminal_state() {
        let state = Arc::new(AppState::new());
        let app = router(state);

        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/schedule/generate")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(minimal_request_json().to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let generated: GenerateResponseDto = serde_json::from_slice(&body).unwrap();
        assert!(!generated.job_id.is_empty());
    }

    #[tokio::test]
    async fn unknown_job_status_is_not_found() {
        let state = Arc::new(AppState::new());
        let app = router(state);
        let response = app
            .oneshot(axum::http::Request::builder().uri("/schedule/status/does-not-exist").body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
