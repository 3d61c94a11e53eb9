use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use sqlx::{PgPool, QueryBuilder};
use tracing::info;

use super::status::ApplicationStatus;
use super::{push_scope, MineQuery};
use crate::accounts::profiles::ensure_seeker_profile;
use crate::auth::permissions::{
    ensure_owner, list_scope, require_employer, require_seeker_role, NOT_ALLOWED,
};
use crate::auth::AuthUser;
use crate::db::is_unique_violation;
use crate::errors::AppError;
use crate::extract::Json;
use crate::jobs::queries::fetch_job;
use crate::models::application::{ApplicationRow, ApplicationView, APPLICATION_SELECT};
use crate::models::job::JobRow;
use crate::state::AppState;

pub const SEEKERS_ONLY: &str = "Only job seekers can apply.";
pub const JOB_UNAVAILABLE: &str = "This job is not available.";
pub const ALREADY_APPLIED: &str = "You have already applied to this job.";
const STATUS_CHANGED: &str = "The application status was changed by another request.";

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub status: Option<String>,
    #[serde(flatten)]
    pub scope: MineQuery,
}

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub job: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateApplicationRequest {
    pub status: String,
}

/// A seeker may apply to an existing, active job they have not applied to yet.
pub fn check_can_apply(job: Option<&JobRow>, already_applied: bool) -> Result<(), AppError> {
    match job {
        Some(job) if job.is_active => {}
        _ => return Err(AppError::forbidden(JOB_UNAVAILABLE)),
    }
    if already_applied {
        return Err(AppError::forbidden(ALREADY_APPLIED));
    }
    Ok(())
}

pub async fn fetch_application(
    pool: &PgPool,
    id: i64,
) -> Result<Option<ApplicationRow>, sqlx::Error> {
    sqlx::query_as::<_, ApplicationRow>(&format!("{APPLICATION_SELECT} WHERE a.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// GET /applications/
pub async fn handle_list_applications(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<ApplicationListQuery>,
) -> Result<Json<Vec<ApplicationView>>, AppError> {
    let mut qb = QueryBuilder::new(APPLICATION_SELECT);
    qb.push(" WHERE TRUE");
    if let Some(raw) = params.status.as_deref().filter(|s| !s.trim().is_empty()) {
        let status = ApplicationStatus::parse_field(raw, "status")?;
        qb.push(" AND a.status = ").push_bind(status.as_str());
    }
    push_scope(&mut qb, list_scope(&caller, params.scope.requested()));
    qb.push(" ORDER BY a.created_at DESC, a.id DESC");

    let rows = qb
        .build_query_as::<ApplicationRow>()
        .fetch_all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(ApplicationView::from).collect()))
}

/// POST /applications/
pub async fn handle_create_application(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationView>), AppError> {
    require_seeker_role(&caller, SEEKERS_ONLY)?;
    let Some(job_id) = request.job else {
        return Err(AppError::field("Invalid application", "job", "This field is required."));
    };
    let seeker = ensure_seeker_profile(&state.db, caller.user.id).await?;

    let job = fetch_job(&state.db, job_id).await?;
    let already_applied: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM applications WHERE job_id = $1 AND seeker_id = $2)",
    )
    .bind(job_id)
    .bind(seeker.id)
    .fetch_one(&state.db)
    .await?;
    check_can_apply(job.as_ref(), already_applied)?;

    let id = insert_application(&state.db, job_id, seeker.id).await?;

    info!(
        "Seeker {} applied to job {job_id} (application {id})",
        seeker.id
    );

    let row = fetch_application(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// Inserts a `PENDING` application. The unique index on (job_id, seeker_id)
/// settles concurrent submissions that both passed the up-front check.
pub async fn insert_application(
    pool: &PgPool,
    job_id: i64,
    seeker_id: i64,
) -> Result<i64, AppError> {
    sqlx::query_scalar(
        "INSERT INTO applications (job_id, seeker_id, status) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(job_id)
    .bind(seeker_id)
    .bind(ApplicationStatus::Pending.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::forbidden(ALREADY_APPLIED)
        } else {
            AppError::Database(e)
        }
    })
}

/// Loads an application the calling provider owns through its job.
async fn fetch_owned_application(
    state: &AppState,
    caller: &AuthUser,
    id: i64,
) -> Result<ApplicationRow, AppError> {
    let employer_id = require_employer(caller, NOT_ALLOWED)?;
    let row = fetch_application(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;
    ensure_owner(employer_id, row.employer_id)?;
    Ok(row)
}

/// GET /applications/:id/
pub async fn handle_get_application(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApplicationView>, AppError> {
    Ok(Json(fetch_owned_application(&state, &caller, id).await?.into()))
}

/// PUT /applications/:id/
pub async fn handle_update_application(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateApplicationRequest>,
) -> Result<Json<ApplicationView>, AppError> {
    let mut row = fetch_owned_application(&state, &caller, id).await?;

    let current = ApplicationStatus::parse(&row.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "application {id} has unknown status {}",
            row.status
        ))
    })?;
    let requested = ApplicationStatus::parse_field(&request.status, "status")?;
    let next = current.transition(requested)?;

    if next != current {
        store_transition(&state.db, id, current, next).await?;
        info!(
            "Application {id} moved from {} to {}",
            current.as_str(),
            next.as_str()
        );
        row.status = next.as_str().to_string();
    }

    Ok(Json(row.into()))
}

/// Writes `next` only while the row still holds `current`, so two racing
/// updates cannot both leave `current`.
pub async fn store_transition(
    pool: &PgPool,
    id: i64,
    current: ApplicationStatus,
    next: ApplicationStatus,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE applications SET status = $2 WHERE id = $1 AND status = $3")
        .bind(id)
        .bind(next.as_str())
        .bind(current.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(STATUS_CHANGED.to_string()));
    }
    Ok(())
}
