use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::{PgConnection, QueryBuilder};
use tracing::info;

use super::{push_scope, MineQuery};
use crate::auth::permissions::{ensure_owner, list_scope, require_employer, NOT_ALLOWED};
use crate::auth::AuthUser;
use crate::errors::{AppError, FieldErrors};
use crate::extract::Json;
use crate::models::interview::Interview;
use crate::state::AppState;

const PROVIDERS_ONLY: &str = "Only providers can schedule interviews.";
const INVALID_APPLICATION: &str = "Invalid application.";

#[derive(Debug, Deserialize)]
pub struct CreateInterviewRequest {
    pub application: Option<i64>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInterview {
    pub application_id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl CreateInterviewRequest {
    pub fn validate(&self) -> Result<NewInterview, AppError> {
        let mut errors = FieldErrors::new();
        let mut push = |field: &str, msg: &str| {
            errors
                .entry(field.to_string())
                .or_default()
                .push(msg.to_string());
        };

        if self.application.is_none() {
            push("application", "This field is required.");
        }
        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            push("title", "This field may not be blank.");
        }
        let date = self
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());
        if date.is_none() {
            push("date", "Date has wrong format. Use YYYY-MM-DD.");
        }
        let time = self.time.as_deref().and_then(parse_time);
        if time.is_none() {
            push("time", "Time has wrong format. Use hh:mm[:ss].");
        }

        match (self.application, date, time) {
            (Some(application_id), Some(date), Some(time)) if errors.is_empty() => Ok(NewInterview {
                application_id,
                title: title.to_string(),
                date,
                time,
            }),
            _ => Err(AppError::FieldErrors {
                message: "Invalid interview".to_string(),
                fields: errors,
            }),
        }
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// What the single appointment of an application looks like after an interview.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub content: String,
}

impl AppointmentDraft {
    pub fn from_interview(interview: &Interview) -> Self {
        Self {
            title: interview.title.clone(),
            date: interview.date,
            time: interview.time,
            content: format!("Interview: {}", interview.title),
        }
    }
}

/// Creates or overwrites the appointment of `application_id`.
/// The unique index on `appointments.application_id` keeps it to one row.
pub async fn upsert_appointment(
    conn: &mut PgConnection,
    application_id: i64,
    draft: &AppointmentDraft,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO appointments (application_id, title, date, time, content)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (application_id) DO UPDATE
        SET title = EXCLUDED.title, date = EXCLUDED.date, time = EXCLUDED.time,
            content = EXCLUDED.content
        RETURNING id
        "#,
    )
    .bind(application_id)
    .bind(&draft.title)
    .bind(draft.date)
    .bind(draft.time)
    .bind(&draft.content)
    .fetch_one(conn)
    .await
}

/// Employer that owns the job behind an application.
async fn application_owner(
    state: &AppState,
    application_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT j.employer_id FROM applications a JOIN jobs j ON j.id = a.job_id WHERE a.id = $1",
    )
    .bind(application_id)
    .fetch_optional(&state.db)
    .await
}

/// POST /interviews/
pub async fn handle_create_interview(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<Interview>), AppError> {
    let employer_id = require_employer(&caller, PROVIDERS_ONLY)?;
    let new = request.validate()?;

    let owner = application_owner(&state, new.application_id)
        .await?
        .ok_or_else(|| AppError::forbidden(INVALID_APPLICATION))?;
    ensure_owner(employer_id, owner)?;

    let mut tx = state.db.begin().await?;

    let interview = sqlx::query_as::<_, Interview>(
        r#"
        INSERT INTO interviews (application_id, title, date, time)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(new.application_id)
    .bind(&new.title)
    .bind(new.date)
    .bind(new.time)
    .fetch_one(&mut *tx)
    .await?;

    let appointment_id = upsert_appointment(
        &mut *tx,
        interview.application_id,
        &AppointmentDraft::from_interview(&interview),
    )
    .await?;

    tx.commit().await?;

    info!(
        "Interview {} scheduled for application {}; appointment {appointment_id} synced",
        interview.id, interview.application_id
    );
    Ok((StatusCode::CREATED, Json(interview)))
}

/// GET /interviews/
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(params): Query<MineQuery>,
) -> Result<Json<Vec<Interview>>, AppError> {
    let mut qb = QueryBuilder::new(
        r#"
        SELECT i.*
        FROM interviews i
        JOIN applications a ON a.id = i.application_id
        JOIN jobs j ON j.id = a.job_id
        WHERE TRUE
        "#,
    );
    push_scope(&mut qb, list_scope(&caller, params.requested()));
    qb.push(" ORDER BY i.created_at DESC, i.id DESC");

    let interviews = qb
        .build_query_as::<Interview>()
        .fetch_all(&state.db)
        .await?;
    Ok(Json(interviews))
}

async fn fetch_owned_interview(
    state: &AppState,
    caller: &AuthUser,
    id: i64,
) -> Result<Interview, AppError> {
    let employer_id = require_employer(caller, NOT_ALLOWED)?;
    let interview = sqlx::query_as::<_, Interview>("SELECT * FROM interviews WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;
    let owner = application_owner(state, interview.application_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;
    ensure_owner(employer_id, owner)?;
    Ok(interview)
}

/// GET /interviews/:id/
pub async fn handle_get_interview(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Interview>, AppError> {
    Ok(Json(fetch_owned_interview(&state, &caller, id).await?))
}

/// DELETE /interviews/:id/
///
/// Removes the interview only; the application's appointment is left as is.
pub async fn handle_delete_interview(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    fetch_owned_interview(&state, &caller, id).await?;
    sqlx::query("DELETE FROM interviews WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    info!("Interview {id} deleted by user {}", caller.user.id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use sqlx::PgPool;

    use super::*;
    use crate::routes::test_support::{app, apply, post_job, register, send};

    fn interview(id: i64, title: &str, date: (i32, u32, u32), time: (u32, u32)) -> Interview {
        Interview {
            id,
            application_id: 5,
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            time: NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_draft_copies_interview_fields() {
        let screen = interview(1, "Tech screen", (2025, 5, 2), (10, 30));
        let draft = AppointmentDraft::from_interview(&screen);
        assert_eq!(draft.title, "Tech screen");
        assert_eq!(draft.content, "Interview: Tech screen");
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
        assert_eq!(draft.time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }

    #[test]
    fn test_validate_accepts_short_and_long_time() {
        for time in ["09:15", "09:15:00"] {
            let req = CreateInterviewRequest {
                application: Some(3),
                title: Some(" Final round ".to_string()),
                date: Some("2025-06-01".to_string()),
                time: Some(time.to_string()),
            };
            let new = req.validate().unwrap();
            assert_eq!(new.title, "Final round");
            assert_eq!(new.time, NaiveTime::from_hms_opt(9, 15, 0).unwrap());
        }
    }

    #[test]
    fn test_validate_reports_each_bad_field() {
        let req = CreateInterviewRequest {
            application: None,
            title: Some("   ".to_string()),
            date: Some("01/06/2025".to_string()),
            time: Some("9am".to_string()),
        };
        match req.validate().unwrap_err() {
            AppError::FieldErrors { fields, .. } => {
                for f in ["application", "title", "date", "time"] {
                    assert!(fields.contains_key(f), "missing {f}");
                }
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_second_interview_overwrites_the_appointment(pool: PgPool) {
        let app = app(pool.clone());
        let (_, provider) = register(&app, "hr@acme.test", "provider").await;
        let (_, seeker) = register(&app, "sam@seeker.test", "seeker").await;
        let job_id = post_job(&app, &provider, "Backend Eng").await;
        let (_, body) = apply(&app, &seeker, job_id).await;
        let application_id = body["id"].as_i64().unwrap();

        let rounds = [
            ("Tech screen", "2025-05-02", "10:30"),
            ("Onsite", "2025-05-09", "14:00"),
        ];
        for (title, date, time) in rounds {
            let payload = json!({
                "application": application_id,
                "title": title,
                "date": date,
                "time": time,
            });
            let (status, body) =
                send(&app, "POST", "/interviews/", Some(&provider), Some(payload)).await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
        }

        let rows: Vec<(String, String, NaiveDate, NaiveTime)> = sqlx::query_as(
            "SELECT title, content, date, time FROM appointments WHERE application_id = $1",
        )
        .bind(application_id)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        let (title, content, date, time) = &rows[0];
        assert_eq!(title, "Onsite");
        assert_eq!(content, "Interview: Onsite");
        assert_eq!(*date, NaiveDate::from_ymd_opt(2025, 5, 9).unwrap());
        assert_eq!(*time, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_other_provider_cannot_schedule(pool: PgPool) {
        let app = app(pool);
        let (_, provider) = register(&app, "hr@acme.test", "provider").await;
        let (_, rival) = register(&app, "hr@rival.test", "provider").await;
        let (_, seeker) = register(&app, "sam@seeker.test", "seeker").await;
        let job_id = post_job(&app, &provider, "Backend Eng").await;
        let (_, body) = apply(&app, &seeker, job_id).await;

        let payload = json!({
            "application": body["id"],
            "title": "Onsite",
            "date": "2025-05-09",
            "time": "14:00",
        });
        let (status, _) = send(&app, "POST", "/interviews/", Some(&rival), Some(payload)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
