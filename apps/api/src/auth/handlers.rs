use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::session::create_session;
use super::verify_password;
use crate::accounts::registration::{create_account, RegistrationRequest};
use crate::errors::AppError;
use crate::extract::Json;
use crate::models::user::User;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: RegisteredUser,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoggedInUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoggedInUser,
}

/// POST /users/register/
pub async fn handle_register(
    State(state): State<AppState>,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let (user, token) = create_account(&state.db, &request, true).await?;
    let token = token.ok_or_else(|| AppError::Internal(anyhow::anyhow!("no token issued")))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: RegisteredUser {
                id: user.id,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
                role: user.role,
            },
            token,
        }),
    ))
}

/// POST /users/login/
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Must include 'email' and 'password'.".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
        .bind(email)
        .fetch_optional(&state.db)
        .await?
        .filter(|u| verify_password(&request.password, &u.password_hash))
        .ok_or_else(|| {
            AppError::Validation("Unable to log in with provided credentials.".to_string())
        })?;

    if !user.is_active {
        return Err(AppError::Validation("User account is disabled.".into()));
    }

    let token = create_session(&state.db, user.id).await?;
    sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
        .bind(user.id)
        .execute(&state.db)
        .await?;

    info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        token,
        user: LoggedInUser {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        },
    }))
}
