use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::errors::{AppError, FieldErrors};
use crate::filters::{contains_pattern, is_truthy, non_blank};
use crate::models::job::{JobRow, JOB_SELECT};

/// Upper bound on the number of jobs handed to the recommendation model.
pub const MAX_RECOMMENDATION_POOL: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    pub q: Option<String>,
    pub location: Option<String>,
    pub mine: Option<String>,
}

/// Active jobs, newest first, with the optional text/location/owner filters.
/// `mine` only applies when the caller has an employer profile.
pub fn build_job_list_query(
    params: &JobListQuery,
    caller_employer_id: Option<i64>,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(JOB_SELECT);
    qb.push(" WHERE j.is_active");

    if let Some(q) = non_blank(params.q.as_deref()) {
        let pattern = contains_pattern(q);
        qb.push(" AND (LOWER(j.title) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(j.description) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(j.requirement) LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(location) = non_blank(params.location.as_deref()) {
        qb.push(" AND LOWER(j.location) LIKE ")
            .push_bind(contains_pattern(location));
    }

    if let (true, Some(employer_id)) = (is_truthy(params.mine.as_deref()), caller_employer_id) {
        qb.push(" AND j.employer_id = ").push_bind(employer_id);
    }

    qb.push(" ORDER BY j.created_at DESC, j.id DESC");
    qb
}

pub async fn fetch_job(pool: &PgPool, id: i64) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(&format!("{JOB_SELECT} WHERE j.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// The candidate pool for a recommendation: most recent active jobs.
pub async fn fetch_active_pool(pool: &PgPool, size: i64) -> Result<Vec<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(&format!(
        "{JOB_SELECT} WHERE j.is_active ORDER BY j.created_at DESC, j.id DESC LIMIT $1"
    ))
    .bind(size)
    .fetch_all(pool)
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// Write payloads
// ────────────────────────────────────────────────────────────────────────────

/// Body of POST and PUT on jobs. On PUT, absent fields keep their value.
#[derive(Debug, Default, Deserialize)]
pub struct JobPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirement: Option<String>,
    pub salary: Option<Decimal>,
    pub location: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobFields {
    pub title: String,
    pub description: String,
    pub requirement: String,
    pub salary: Option<Decimal>,
    pub location: String,
    pub is_active: bool,
}

impl From<&JobRow> for JobFields {
    fn from(row: &JobRow) -> Self {
        Self {
            title: row.title.clone(),
            description: row.description.clone(),
            requirement: row.requirement.clone(),
            salary: row.salary,
            location: row.location.clone(),
            is_active: row.is_active,
        }
    }
}

impl JobPayload {
    /// Merges the payload over `base` (or over empty defaults on create)
    /// and checks the result.
    pub fn merge(self, base: Option<JobFields>) -> Result<JobFields, AppError> {
        let base = base.unwrap_or(JobFields {
            title: String::new(),
            description: String::new(),
            requirement: String::new(),
            salary: None,
            location: String::new(),
            is_active: true,
        });
        let fields = JobFields {
            title: self.title.map_or(base.title, |t| t.trim().to_string()),
            description: self.description.unwrap_or(base.description),
            requirement: self.requirement.unwrap_or(base.requirement),
            salary: self.salary.or(base.salary),
            location: self.location.unwrap_or(base.location),
            is_active: self.is_active.unwrap_or(base.is_active),
        };

        let mut errors = FieldErrors::new();
        if fields.title.is_empty() {
            errors.insert("title".into(), vec!["This field may not be blank.".into()]);
        } else if fields.title.chars().count() > 255 {
            errors.insert(
                "title".into(),
                vec!["Ensure this field has no more than 255 characters.".into()],
            );
        }
        if fields.description.trim().is_empty() {
            errors.insert(
                "description".into(),
                vec!["This field may not be blank.".into()],
            );
        }
        if fields.salary.is_some_and(|s| s.is_sign_negative()) {
            errors.insert(
                "salary".into(),
                vec!["Ensure this value is greater than or equal to 0.".into()],
            );
        }

        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(AppError::FieldErrors {
                message: "Invalid job".to_string(),
                fields: errors,
            })
        }
    }
}
