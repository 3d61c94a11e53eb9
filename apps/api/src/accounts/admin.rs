//! Administrator account management under `/system/users/`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use tracing::info;

use crate::accounts::profiles::ensure_role_profile;
use crate::accounts::registration::{create_account, RegistrationRequest};
use crate::auth::permissions::ensure_can_set_privilege_flags;
use crate::auth::AdminUser;
use crate::errors::AppError;
use crate::extract::Json;
use crate::filters::{contains_pattern, non_blank, tri_state};
use crate::models::user::{AdminUserView, Gender, Role, User};
use crate::state::AppState;

const UPDATE_FAILED: &str = "Account update failed";
const INVALID_GENDER: &str = "Must be 'MALE', 'FEMALE', or 'OTHER'.";
const INVALID_DOB: &str = "Date has wrong format. Use YYYY-MM-DD.";

// ────────────────────────────────────────────────────────────────────────────
// Listing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AdminUserQuery {
    pub q: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<String>,
    pub is_staff: Option<String>,
    pub is_superuser: Option<String>,
}

/// Builds the filtered account listing, newest accounts first.
pub fn build_user_list_query(params: &AdminUserQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT * FROM users WHERE TRUE");

    if let Some(q) = non_blank(params.q.as_deref()) {
        let pattern = contains_pattern(q);
        qb.push(" AND (LOWER(email) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(first_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(last_name) LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    // Unknown roles are ignored rather than rejected.
    if let Some(role) = params.role.as_deref().and_then(Role::parse) {
        qb.push(" AND role = ").push_bind(role.as_str());
    }

    for (column, value) in [
        ("is_active", &params.is_active),
        ("is_staff", &params.is_staff),
        ("is_superuser", &params.is_superuser),
    ] {
        if let Some(flag) = tri_state(value.as_deref()) {
            qb.push(format!(" AND {column} = ")).push_bind(flag);
        }
    }

    qb.push(" ORDER BY date_joined DESC, id DESC");
    qb
}

/// GET /system/users/
pub async fn handle_list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<AdminUserQuery>,
) -> Result<Json<Vec<AdminUserView>>, AppError> {
    let users = build_user_list_query(&params)
        .build_query_as::<User>()
        .fetch_all(&state.db)
        .await?;
    Ok(Json(users.into_iter().map(AdminUserView::from).collect()))
}

/// POST /system/users/
pub async fn handle_create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<AdminUserView>), AppError> {
    let (user, _) = create_account(&state.db, &request, false).await?;
    info!("Admin {} created account {}", admin.user.id, user.id);
    Ok((StatusCode::CREATED, Json(AdminUserView::from(user))))
}

async fn fetch_user(state: &AppState, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}

/// GET /system/users/:id/
pub async fn handle_get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<AdminUserView>, AppError> {
    Ok(Json(fetch_user(&state, id).await?.into()))
}

// ────────────────────────────────────────────────────────────────────────────
// Update
// ────────────────────────────────────────────────────────────────────────────

/// Constrained set of fields an administrator may change.
/// Absent fields are left untouched; empty strings clear optional fields.
#[derive(Debug, Default, Deserialize)]
pub struct AdminUserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
}

impl AdminUserUpdate {
    fn touches_privilege_flags(&self) -> bool {
        self.is_staff.is_some() || self.is_superuser.is_some()
    }

    /// Validates the patch for `actor` and applies it to `target`.
    pub fn apply(self, actor: &User, target: &mut User) -> Result<(), AppError> {
        ensure_can_set_privilege_flags(actor, self.touches_privilege_flags())?;

        let role = match self.role.as_deref() {
            None => None,
            Some(raw) => Some(Role::parse(raw).ok_or_else(|| {
                AppError::field(
                    UPDATE_FAILED,
                    "role",
                    "Invalid role. Must be 'seeker' or 'provider'.",
                )
            })?),
        };

        let gender = match self.gender.as_deref().map(str::trim) {
            None => None,
            Some("") => Some(None),
            Some(raw) => match Gender::parse(raw) {
                Some(gender) => Some(Some(gender)),
                None => return Err(AppError::field(UPDATE_FAILED, "gender", INVALID_GENDER)),
            },
        };

        let dob = match self.dob.as_deref().map(str::trim) {
            None => None,
            Some("") => Some(None),
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(dob) => Some(Some(dob)),
                Err(_) => return Err(AppError::field(UPDATE_FAILED, "dob", INVALID_DOB)),
            },
        };

        if let Some(first_name) = self.first_name {
            target.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            target.last_name = last_name;
        }
        if let Some(role) = role {
            target.role = role.as_str().to_string();
        }
        if let Some(is_active) = self.is_active {
            target.is_active = is_active;
        }
        if let Some(is_staff) = self.is_staff {
            target.is_staff = is_staff;
        }
        if let Some(is_superuser) = self.is_superuser {
            target.is_superuser = is_superuser;
        }
        if let Some(phone) = self.phone {
            let phone = phone.trim().to_string();
            target.phone = (!phone.is_empty()).then_some(phone);
        }
        if let Some(gender) = gender {
            target.gender = gender.map(|g| g.as_str().to_string());
        }
        if let Some(dob) = dob {
            target.dob = dob;
        }
        Ok(())
    }
}

/// PUT /system/users/:id/
pub async fn handle_update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    Json(update): Json<AdminUserUpdate>,
) -> Result<Json<AdminUserView>, AppError> {
    let mut user = fetch_user(&state, id).await?;
    let previous_role = user.role();
    update.apply(&admin.user, &mut user)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET first_name = $2, last_name = $3, role = $4, is_active = $5, is_staff = $6,
            is_superuser = $7, phone = $8, gender = $9, dob = $10
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.role)
    .bind(user.is_active)
    .bind(user.is_staff)
    .bind(user.is_superuser)
    .bind(&user.phone)
    .bind(&user.gender)
    .bind(user.dob)
    .fetch_one(&state.db)
    .await?;

    if user.role() != previous_role {
        info!(
            "Admin {} changed role of user {} to {}",
            admin.user.id,
            user.id,
            user.role().as_str()
        );
        ensure_role_profile(&state.db, &user).await?;
    }

    Ok(Json(user.into()))
}

/// DELETE /system/users/:id/
///
/// Deactivates the account; the row and everything linked to it are kept.
pub async fn handle_deactivate_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }

    info!("Admin {} deactivated user {id}", admin.user.id);
    Ok(StatusCode::NO_CONTENT)
}
