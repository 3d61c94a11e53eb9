use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Interview {
    pub id: i64,
    #[serde(rename = "application")]
    pub application_id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

pub const APPOINTMENT_SELECT: &str = r#"
    SELECT p.id, p.application_id, p.title, p.date, p.time, p.content, p.created_at,
           j.title AS job_title, e.company_name AS employer_company,
           u.email AS seeker_email
    FROM appointments p
    JOIN applications a ON a.id = p.application_id
    JOIN jobs j ON j.id = a.job_id
    JOIN employers e ON e.id = j.employer_id
    JOIN job_seekers s ON s.id = a.seeker_id
    JOIN users u ON u.id = s.user_id
"#;

#[derive(Debug, Clone, FromRow)]
pub struct AppointmentRow {
    pub id: i64,
    pub application_id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub job_title: String,
    pub employer_company: String,
    pub seeker_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationInfo {
    pub application_id: i64,
    pub job_title: String,
    pub employer_company: String,
    pub seeker_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentView {
    pub id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub application: i64,
    pub application_info: ApplicationInfo,
    pub room: String,
}

impl From<AppointmentRow> for AppointmentView {
    fn from(row: AppointmentRow) -> Self {
        let room = room_name(row.id, row.date);
        Self {
            id: row.id,
            title: row.title,
            date: row.date,
            time: row.time,
            content: row.content,
            created_at: row.created_at,
            application: row.application_id,
            application_info: ApplicationInfo {
                application_id: row.application_id,
                job_title: row.job_title,
                employer_company: row.employer_company,
                seeker_email: row.seeker_email,
            },
            room,
        }
    }
}

/// Deterministic meeting-room name for an appointment.
pub fn room_name(appointment_id: i64, date: NaiveDate) -> String {
    format!("appt_{}_{}", appointment_id, date.format("%Y%m%d"))
}
