pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::accounts::{admin, payments, profiles};
use crate::auth::handlers as auth;
use crate::jobs::handlers as jobs;
use crate::recommendation::handlers as recommendation;
use crate::state::AppState;
use crate::workflow::{applications, appointments, interviews};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/users/register/", post(auth::handle_register))
        .route("/users/login/", post(auth::handle_login))
        .route(
            "/users/me/seeker/",
            get(profiles::handle_get_seeker_profile).put(profiles::handle_update_seeker_profile),
        )
        .route(
            "/users/me/employer/",
            get(profiles::handle_get_employer_profile)
                .put(profiles::handle_update_employer_profile),
        )
        .route(
            "/users/me/payments/",
            get(payments::handle_list_my_payments),
        )
        // Jobs
        .route(
            "/jobs/",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/jobs/:id/",
            get(jobs::handle_get_job)
                .put(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route(
            "/ai/recommend-job/",
            post(recommendation::handle_recommend_job),
        )
        // Workflow
        .route(
            "/applications/",
            get(applications::handle_list_applications)
                .post(applications::handle_create_application),
        )
        .route(
            "/applications/:id/",
            get(applications::handle_get_application)
                .put(applications::handle_update_application),
        )
        .route(
            "/interviews/",
            get(interviews::handle_list_interviews).post(interviews::handle_create_interview),
        )
        .route(
            "/interviews/:id/",
            get(interviews::handle_get_interview).delete(interviews::handle_delete_interview),
        )
        .route(
            "/appointments/",
            get(appointments::handle_list_appointments),
        )
        // Administration
        .route(
            "/system/users/",
            get(admin::handle_list_users).post(admin::handle_create_user),
        )
        .route(
            "/system/users/:id/",
            get(admin::handle_get_user)
                .put(admin::handle_update_user)
                .delete(admin::handle_deactivate_user),
        )
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use sqlx::PgPool;
    use tower::ServiceExt;

    use super::build_router;
    use crate::recommendation::pipeline::test_support::FakeMatcher;
    use crate::recommendation::pipeline::JobMatcher;
    use crate::state::AppState;

    pub const PASSWORD: &str = "Quiet-Harbor-77";

    pub fn app(db: PgPool) -> Router {
        app_with(db, FakeMatcher::failing())
    }

    pub fn app_with(db: PgPool, matcher: impl JobMatcher + 'static) -> Router {
        build_router(AppState {
            db,
            matcher: Arc::new(matcher),
        })
    }

    /// Runs one request and decodes the JSON body (`Null` when empty).
    pub async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        call(app, builder.body(body).unwrap()).await
    }

    /// Registers an account and returns its user id and bearer token.
    pub async fn register(app: &Router, email: &str, role: &str) -> (i64, String) {
        let payload = json!({
            "email": email,
            "password": PASSWORD,
            "fullName": "Test Person",
            "role": role,
        });
        let (status, body) = send(app, "POST", "/users/register/", None, Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["user"]["id"].as_i64().unwrap();
        let token = body["token"].as_str().unwrap().to_string();
        (id, token)
    }

    /// Posts an active job as the provider behind `token`; returns the job id.
    pub async fn post_job(app: &Router, token: &str, title: &str) -> i64 {
        let payload = json!({
            "title": title,
            "description": "Build and run things.",
            "location": "Douala",
        });
        let (status, body) = send(app, "POST", "/jobs/", Some(token), Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    /// Applies to `job_id` as the seeker behind `token`.
    pub async fn apply(app: &Router, token: &str, job_id: i64) -> (StatusCode, Value) {
        let payload = json!({ "job": job_id });
        send(app, "POST", "/applications/", Some(token), Some(payload)).await
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;

    use super::test_support::{app, call};

    // Lazy pool: no connection is made unless a handler reaches the database.
    fn offline_app() -> axum::Router {
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/jobboard_test")
            .unwrap();
        app(db)
    }

    async fn status_of(method: &str, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        call(&offline_app(), request).await.0
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        assert_eq!(status_of("GET", "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        assert_eq!(status_of("POST", "/jobs/").await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of("GET", "/system/users/").await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of("GET", "/applications/").await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        assert_eq!(status_of("GET", "/nope/").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let request = Request::builder()
            .method("POST")
            .uri("/users/register/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"email\": "))
            .unwrap();
        let (status, body) = call(&offline_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_missing_content_type_uses_error_envelope() {
        let request = Request::builder()
            .method("POST")
            .uri("/users/login/")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = call(&offline_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
