use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// Column list shared by every query that returns a `JobRow`.
pub const JOB_SELECT: &str = r#"
    SELECT j.id, j.employer_id, j.title, j.description, j.requirement, j.salary,
           j.location, j.is_active, j.created_at,
           e.company_name AS employer_company_name,
           u.email AS employer_email
    FROM jobs j
    JOIN employers e ON e.id = j.employer_id
    JOIN users u ON u.id = e.user_id
"#;

/// A job joined with the employer fields exposed in its read view.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub employer_id: i64,
    pub title: String,
    pub description: String,
    pub requirement: String,
    pub salary: Option<Decimal>,
    pub location: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub employer_company_name: String,
    pub employer_email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobEmployer {
    pub id: i64,
    pub company_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub requirement: String,
    pub salary: Option<Decimal>,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub employer: JobEmployer,
}

impl From<JobRow> for JobView {
    fn from(row: JobRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            requirement: row.requirement,
            salary: row.salary,
            location: row.location,
            created_at: row.created_at,
            is_active: row.is_active,
            employer: JobEmployer {
                id: row.employer_id,
                company_name: row.employer_company_name,
                email: row.employer_email,
            },
        }
    }
}
