use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::info;

use super::queries::{build_job_list_query, fetch_job, JobFields, JobListQuery, JobPayload};
use crate::auth::permissions::{ensure_owner, require_employer};
use crate::auth::{AuthUser, MaybeUser};
use crate::errors::AppError;
use crate::extract::Json;
use crate::models::job::{JobRow, JobView};
use crate::state::AppState;

const PROVIDERS_ONLY: &str = "Only providers can post jobs.";
const OWNER_ONLY: &str = "Only the employer that posted this job can change it.";

/// GET /jobs/
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    Query(params): Query<JobListQuery>,
) -> Result<Json<Vec<JobView>>, AppError> {
    let employer_id = caller.and_then(|c| c.profile.employer_id());
    let rows = build_job_list_query(&params, employer_id)
        .build_query_as::<JobRow>()
        .fetch_all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(JobView::from).collect()))
}

/// POST /jobs/
pub async fn handle_create_job(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(payload): Json<JobPayload>,
) -> Result<(StatusCode, Json<JobView>), AppError> {
    let employer_id = require_employer(&caller, PROVIDERS_ONLY)?;
    let fields = payload.merge(None)?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO jobs (employer_id, title, description, requirement, salary, location, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(employer_id)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.requirement)
    .bind(fields.salary)
    .bind(&fields.location)
    .bind(fields.is_active)
    .fetch_one(&state.db)
    .await?;

    info!("Employer {employer_id} posted job {id}");

    let row = fetch_job(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /jobs/:id/
///
/// Inactive jobs are only visible to the employer that owns them.
pub async fn handle_get_job(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<JobView>, AppError> {
    let row = fetch_job(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    let is_owner = caller
        .and_then(|c| c.profile.employer_id())
        .is_some_and(|employer_id| employer_id == row.employer_id);
    if !row.is_active && !is_owner {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }

    Ok(Json(row.into()))
}

/// Loads a job and checks that the caller's employer owns it.
async fn fetch_owned_job(state: &AppState, caller: &AuthUser, id: i64) -> Result<JobRow, AppError> {
    let employer_id = require_employer(caller, OWNER_ONLY)?;
    let row = fetch_job(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    ensure_owner(employer_id, row.employer_id)?;
    Ok(row)
}

/// PUT /jobs/:id/
pub async fn handle_update_job(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<JobPayload>,
) -> Result<Json<JobView>, AppError> {
    let current = fetch_owned_job(&state, &caller, id).await?;
    let fields = payload.merge(Some(JobFields::from(&current)))?;

    sqlx::query(
        r#"
        UPDATE jobs
        SET title = $2, description = $3, requirement = $4, salary = $5, location = $6,
            is_active = $7
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.requirement)
    .bind(fields.salary)
    .bind(&fields.location)
    .bind(fields.is_active)
    .execute(&state.db)
    .await?;

    let row = fetch_job(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(row.into()))
}

/// DELETE /jobs/:id/
///
/// Deactivates the job. Applications and interviews against it are kept.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    fetch_owned_job(&state, &caller, id).await?;

    sqlx::query("UPDATE jobs SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    info!("Job {id} deactivated by user {}", caller.user.id);
    Ok(StatusCode::NO_CONTENT)
}
