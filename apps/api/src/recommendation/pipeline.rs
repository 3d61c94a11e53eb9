//! Recommendation pipeline: prompt, one model call, parse, resolve.
//!
//! The matcher is a trait so the model backend can be swapped (and faked in
//! tests) without touching the handler. `AppState` carries `Arc<dyn JobMatcher>`.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Number;
use tracing::{info, warn};

use super::parse::{parse_model_reply, ModelReply};
use super::prompts::matcher_messages;
use crate::errors::AppError;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::job::JobView;

/// The part of a job the model gets to see. Salary and employer stay out.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateJob {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub requirement: String,
    pub location: String,
}

impl From<&JobView> for CandidateJob {
    fn from(job: &JobView) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            description: job.description.clone(),
            requirement: job.requirement.clone(),
            location: job.location.clone(),
        }
    }
}

/// Returns the model's raw reply for a resume against a set of candidates.
#[async_trait]
pub trait JobMatcher: Send + Sync {
    async fn pick_best(
        &self,
        resume_text: &str,
        candidates: &[CandidateJob],
    ) -> Result<String, LlmError>;
}

/// Chat-completions backed matcher.
pub struct LlmJobMatcher(pub LlmClient);

#[async_trait]
impl JobMatcher for LlmJobMatcher {
    async fn pick_best(
        &self,
        resume_text: &str,
        candidates: &[CandidateJob],
    ) -> Result<String, LlmError> {
        let messages = matcher_messages(resume_text, candidates)?;
        self.0.complete(&messages).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    UnparsableReply,
    MissingJobId,
    JobNotInPool(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    ModelChoice,
    Fallback(FallbackReason),
}

#[derive(Debug, Clone)]
pub struct Recommendation {
    pub job: JobView,
    pub score: Option<Number>,
    pub reason: Option<String>,
    pub resolution: Resolution,
}

/// Picks one job from `pool`. The result is always a member of `pool`:
/// a model id outside it falls back to the first (newest) entry.
pub async fn recommend(
    matcher: &dyn JobMatcher,
    resume_text: &str,
    pool: Vec<JobView>,
) -> Result<Recommendation, AppError> {
    if pool.is_empty() {
        return Err(AppError::NotFound("No active jobs available.".into()));
    }

    let candidates: Vec<CandidateJob> = pool.iter().map(CandidateJob::from).collect();
    let raw = matcher
        .pick_best(resume_text, &candidates)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    let reply = parse_model_reply(&raw);
    let parsed = matches!(reply, ModelReply::Parsed(_));
    let pick = reply.into_pick();

    let chosen = pick
        .best_job_id
        .and_then(|id| pool.iter().position(|job| job.id == id));

    let (index, resolution) = match (chosen, pick.best_job_id, parsed) {
        (Some(index), _, _) => (index, Resolution::ModelChoice),
        (None, _, false) => (0, Resolution::Fallback(FallbackReason::UnparsableReply)),
        (None, None, true) => (0, Resolution::Fallback(FallbackReason::MissingJobId)),
        (None, Some(id), true) => (0, Resolution::Fallback(FallbackReason::JobNotInPool(id))),
    };

    let mut pool = pool;
    let job = pool.swap_remove(index);

    match resolution {
        Resolution::ModelChoice => info!(
            "Model recommended job {} out of {} candidates",
            job.id,
            candidates.len()
        ),
        Resolution::Fallback(reason) => warn!(
            "Recommendation fell back to job {} ({reason:?}); raw reply: {raw:.200}",
            job.id
        ),
    }

    Ok(Recommendation {
        job,
        score: pick.score,
        reason: pick.reason,
        resolution,
    })
}
