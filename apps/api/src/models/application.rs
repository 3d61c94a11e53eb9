use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const APPLICATION_SELECT: &str = r#"
    SELECT a.id, a.job_id, a.seeker_id, a.status, a.match_score, a.created_at,
           j.title AS job_title, j.employer_id,
           s.resume_url AS seeker_resume_url, s.resume_text AS seeker_resume_text,
           u.email AS seeker_email
    FROM applications a
    JOIN jobs j ON j.id = a.job_id
    JOIN job_seekers s ON s.id = a.seeker_id
    JOIN users u ON u.id = s.user_id
"#;

#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: i64,
    pub job_id: i64,
    pub seeker_id: i64,
    pub status: String,
    pub match_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub job_title: String,
    pub employer_id: i64,
    pub seeker_resume_url: String,
    pub seeker_resume_text: String,
    pub seeker_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobInfo {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeekerInfo {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: i64,
    pub job_info: JobInfo,
    pub seeker: SeekerInfo,
    pub seeker_resume_url: String,
    pub seeker_resume_text: String,
    pub status: String,
    pub match_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<ApplicationRow> for ApplicationView {
    fn from(row: ApplicationRow) -> Self {
        Self {
            id: row.id,
            job_info: JobInfo {
                id: row.job_id,
                title: row.job_title,
            },
            seeker: SeekerInfo {
                id: row.seeker_id,
                email: row.seeker_email,
            },
            seeker_resume_url: row.seeker_resume_url,
            seeker_resume_text: row.seeker_resume_text,
            status: row.status,
            match_score: row.match_score,
            created_at: row.created_at,
        }
    }
}
