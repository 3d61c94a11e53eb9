use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use crate::auth::permissions::require_seeker_role;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::extract::Json;
use crate::models::profile::{Employer, JobSeeker, ProfileRef};
use crate::models::user::{Role, User};
use crate::state::AppState;

/// Looks up the profile matching the user's role.
pub async fn lookup_profile(pool: &PgPool, user: &User) -> Result<ProfileRef, sqlx::Error> {
    let profile = match user.role() {
        Role::Seeker => {
            sqlx::query_scalar::<_, i64>("SELECT id FROM job_seekers WHERE user_id = $1")
                .bind(user.id)
                .fetch_optional(pool)
                .await?
                .map(ProfileRef::Seeker)
        }
        Role::Provider => {
            sqlx::query_scalar::<_, i64>("SELECT id FROM employers WHERE user_id = $1")
                .bind(user.id)
                .fetch_optional(pool)
                .await?
                .map(ProfileRef::Employer)
        }
    };
    Ok(profile.unwrap_or(ProfileRef::Missing))
}

/// Returns the user's seeker profile, creating an empty one if absent.
pub async fn ensure_seeker_profile(pool: &PgPool, user_id: i64) -> Result<JobSeeker, sqlx::Error> {
    let created = sqlx::query_as::<_, JobSeeker>(
        r#"
        INSERT INTO job_seekers (user_id) VALUES ($1)
        ON CONFLICT (user_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    match created {
        Some(profile) => {
            info!(
                "Provisioned seeker profile {} for user {user_id}",
                profile.id
            );
            Ok(profile)
        }
        None => {
            sqlx::query_as::<_, JobSeeker>("SELECT * FROM job_seekers WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await
        }
    }
}

/// Returns the user's employer profile, creating an empty one if absent.
pub async fn ensure_employer_profile(pool: &PgPool, user_id: i64) -> Result<Employer, sqlx::Error> {
    let created = sqlx::query_as::<_, Employer>(
        "INSERT INTO employers (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING RETURNING *",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    match created {
        Some(profile) => {
            info!(
                "Provisioned employer profile {} for user {user_id}",
                profile.id
            );
            Ok(profile)
        }
        None => {
            sqlx::query_as::<_, Employer>("SELECT * FROM employers WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await
        }
    }
}

/// Provisions the profile for the user's current role.
pub async fn ensure_role_profile(pool: &PgPool, user: &User) -> Result<(), sqlx::Error> {
    match user.role() {
        Role::Seeker => ensure_seeker_profile(pool, user.id).await.map(|_| ()),
        Role::Provider => ensure_employer_profile(pool, user.id).await.map(|_| ()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Seeker profile
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SeekerProfileView {
    pub id: i64,
    pub resume_url: String,
    pub resume_text: String,
    pub created_at: DateTime<Utc>,
    pub user_email: String,
    pub user_name: String,
}

impl SeekerProfileView {
    fn new(profile: JobSeeker, user: &User) -> Self {
        Self {
            id: profile.id,
            resume_url: profile.resume_url,
            resume_text: profile.resume_text,
            created_at: profile.created_at,
            user_email: user.email.clone(),
            user_name: user.full_name(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SeekerProfileUpdate {
    pub resume_url: Option<String>,
    pub resume_text: Option<String>,
}

const SEEKERS_ONLY: &str = "Only job seekers have a seeker profile.";

/// GET /users/me/seeker/
pub async fn handle_get_seeker_profile(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<SeekerProfileView>, AppError> {
    require_seeker_role(&caller, SEEKERS_ONLY)?;
    let profile = ensure_seeker_profile(&state.db, caller.user.id).await?;
    Ok(Json(SeekerProfileView::new(profile, &caller.user)))
}

/// PUT /users/me/seeker/
pub async fn handle_update_seeker_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(update): Json<SeekerProfileUpdate>,
) -> Result<Json<SeekerProfileView>, AppError> {
    require_seeker_role(&caller, SEEKERS_ONLY)?;
    let current = ensure_seeker_profile(&state.db, caller.user.id).await?;

    let profile = sqlx::query_as::<_, JobSeeker>(
        "UPDATE job_seekers SET resume_url = $2, resume_text = $3 WHERE id = $1 RETURNING *",
    )
    .bind(current.id)
    .bind(update.resume_url.unwrap_or(current.resume_url))
    .bind(update.resume_text.unwrap_or(current.resume_text))
    .fetch_one(&state.db)
    .await?;

    Ok(Json(SeekerProfileView::new(profile, &caller.user)))
}

// ────────────────────────────────────────────────────────────────────────────
// Employer profile
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EmployerProfileUpdate {
    pub company_name: Option<String>,
    pub company_website: Option<String>,
}

const PROVIDERS_ONLY: &str = "Only providers have an employer profile.";

fn require_provider_role(caller: &AuthUser) -> Result<(), AppError> {
    if caller.user.role() == Role::Provider {
        Ok(())
    } else {
        Err(AppError::forbidden(PROVIDERS_ONLY))
    }
}

/// GET /users/me/employer/
pub async fn handle_get_employer_profile(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Employer>, AppError> {
    require_provider_role(&caller)?;
    Ok(Json(ensure_employer_profile(&state.db, caller.user.id).await?))
}

/// PUT /users/me/employer/
pub async fn handle_update_employer_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(update): Json<EmployerProfileUpdate>,
) -> Result<Json<Employer>, AppError> {
    require_provider_role(&caller)?;
    let current = ensure_employer_profile(&state.db, caller.user.id).await?;

    let website = update.company_website.unwrap_or(current.company_website);
    if !website.is_empty() && !(website.starts_with("http://") || website.starts_with("https://")) {
        return Err(AppError::field(
            "Profile update failed",
            "company_website",
            "Enter a valid URL.",
        ));
    }

    let profile = sqlx::query_as::<_, Employer>(
        "UPDATE employers SET company_name = $2, company_website = $3 WHERE id = $1 RETURNING *",
    )
    .bind(current.id)
    .bind(update.company_name.unwrap_or(current.company_name))
    .bind(website)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(profile))
}
