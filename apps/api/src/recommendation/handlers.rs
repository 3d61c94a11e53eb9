use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::pipeline::recommend;
use crate::auth::MaybeUser;
use crate::errors::AppError;
use crate::jobs::queries::{fetch_active_pool, MAX_RECOMMENDATION_POOL};
use crate::models::job::{JobRow, JobView};
use crate::state::AppState;

const DEFAULT_POOL: i64 = 25;
const MIN_POOL: i64 = 5;

#[derive(Debug, Default, Deserialize)]
pub struct RecommendRequest {
    pub resume_text: Option<String>,
    /// Number or numeric string; anything else means the default.
    pub limit: Option<Value>,
}

impl RecommendRequest {
    /// Every field is optional, so an empty body reads as `{}`.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {e}")))
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationSummary {
    pub score: Option<Number>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendation: RecommendationSummary,
    pub job: JobView,
}

/// How many active jobs to offer the model.
pub fn pool_size(limit: Option<&Value>) -> i64 {
    let requested = match limit {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .filter(|&n| n != 0)
    .unwrap_or(DEFAULT_POOL);

    requested.max(MIN_POOL).min(MAX_RECOMMENDATION_POOL)
}

/// POST /ai/recommend-job/
///
/// An empty `resume_text` from a seeker falls back to the resume stored on
/// their profile.
pub async fn handle_recommend_job(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    body: Bytes,
) -> Result<Json<RecommendResponse>, AppError> {
    let req = RecommendRequest::from_body(&body)?;
    let mut resume_text = req
        .resume_text
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    if resume_text.is_empty() {
        if let Some(seeker_id) = caller.and_then(|c| c.profile.seeker_id()) {
            let stored: Option<String> =
                sqlx::query_scalar("SELECT resume_text FROM job_seekers WHERE id = $1")
                    .bind(seeker_id)
                    .fetch_optional(&state.db)
                    .await?;
            resume_text = stored.unwrap_or_default();
        }
    }

    let rows: Vec<JobRow> = fetch_active_pool(&state.db, pool_size(req.limit.as_ref())).await?;
    let pool = rows.into_iter().map(JobView::from).collect();

    let rec = recommend(state.matcher.as_ref(), &resume_text, pool).await?;

    Ok(Json(RecommendResponse {
        recommendation: RecommendationSummary {
            score: rec.score,
            reason: rec.reason,
        },
        job: rec.job,
    }))
}
