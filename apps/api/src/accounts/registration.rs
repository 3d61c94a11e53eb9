use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::auth::hash_password;
use crate::auth::password::validate_password;
use crate::auth::session::create_session;
use crate::db::is_unique_violation;
use crate::errors::{AppError, FieldErrors};
use crate::filters::non_blank;
use crate::models::user::{Gender, Role, User};

pub const REGISTRATION_FAILED: &str = "Registration failed";
const EMAIL_TAKEN: &str = "A user with this email already exists.";

/// Sign-up payload. Every field is optional at the wire level so that
/// missing values surface as field errors instead of body rejections.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "fullName")]
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub tel: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub gender: Option<Gender>,
    pub dob: Option<NaiveDate>,
}

impl RegistrationRequest {
    /// Field-level validation that needs no database access.
    pub fn validate(&self) -> Result<NewAccount, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut push = |field: &str, msg: String| {
            errors.entry(field.to_string()).or_default().push(msg);
        };

        let email = match non_blank(self.email.as_deref()) {
            None => {
                push("email", "This field is required.".to_string());
                String::new()
            }
            Some(raw) => match normalize_email(raw) {
                Some(email) => email,
                None => {
                    push("email", "Enter a valid email address.".to_string());
                    String::new()
                }
            },
        };

        let full_name = [self.full_name.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|n| !n.is_empty())
            .unwrap_or_default();
        let (first_name, last_name) = split_full_name(full_name);

        let password = self.password.clone().unwrap_or_default();
        if password.is_empty() {
            push("password", "This field is required.".to_string());
        } else {
            let local_part = email.split('@').next().unwrap_or_default();
            let attributes = [
                ("email", local_part),
                ("first name", first_name.as_str()),
                ("last name", last_name.as_str()),
            ];
            if let Err(messages) = validate_password(&password, &attributes) {
                for msg in messages {
                    push("password", msg);
                }
            }
        }

        let role = match non_blank(self.role.as_deref()) {
            None => Role::Seeker,
            Some(raw) => Role::parse(raw).unwrap_or_else(|| {
                push(
                    "role",
                    "Invalid role. Must be 'seeker' or 'provider'.".to_string(),
                );
                Role::Seeker
            }),
        };

        let gender = match non_blank(self.gender.as_deref()) {
            None => None,
            Some(raw) => {
                let parsed = Gender::parse(raw);
                if parsed.is_none() {
                    push(
                        "gender",
                        "Invalid gender. Must be 'MALE', 'FEMALE', or 'OTHER'.".to_string(),
                    );
                }
                parsed
            }
        };

        let dob = match non_blank(self.dob.as_deref()) {
            None => None,
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    push(
                        "dob",
                        "Date has wrong format. Use one of these formats instead: YYYY-MM-DD."
                            .to_string(),
                    );
                    None
                }
            },
        };

        let phone = non_blank(self.tel.as_deref()).map(String::from);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewAccount {
            email,
            password,
            first_name,
            last_name,
            role,
            phone,
            gender,
            dob,
        })
    }
}

/// Lower-cases the domain part, keeps the local part as typed.
pub fn normalize_email(raw: &str) -> Option<String> {
    let (local, domain) = raw.trim().rsplit_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains(char::is_whitespace) {
        return None;
    }
    Some(format!("{local}@{}", domain.to_lowercase()))
}

fn split_full_name(full_name: &str) -> (String, String) {
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}

pub async fn email_taken(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
        .bind(email)
        .fetch_one(pool)
        .await
}

/// Validates and creates an account with its role profile in one transaction.
/// When `issue_token` is set a session token is created in the same transaction.
pub async fn create_account(
    pool: &PgPool,
    request: &RegistrationRequest,
    issue_token: bool,
) -> Result<(User, Option<String>), AppError> {
    let account = request.validate().map_err(|fields| AppError::FieldErrors {
        message: REGISTRATION_FAILED.to_string(),
        fields,
    })?;

    if email_taken(pool, &account.email).await? {
        return Err(AppError::field(REGISTRATION_FAILED, "email", EMAIL_TAKEN));
    }

    let password_hash = hash_password(&account.password)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name, role, phone, gender, dob)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(&account.email)
    .bind(&password_hash)
    .bind(&account.first_name)
    .bind(&account.last_name)
    .bind(account.role.as_str())
    .bind(&account.phone)
    .bind(account.gender.map(Gender::as_str))
    .bind(account.dob)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::field(REGISTRATION_FAILED, "email", EMAIL_TAKEN)
        } else {
            AppError::Database(e)
        }
    })?;

    let profile_sql = match account.role {
        Role::Provider => "INSERT INTO employers (user_id) VALUES ($1)",
        Role::Seeker => "INSERT INTO job_seekers (user_id) VALUES ($1)",
    };
    sqlx::query(profile_sql)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    let token = if issue_token {
        Some(create_session(&mut *tx, user.id).await?)
    } else {
        None
    };

    tx.commit().await?;

    info!("Registered user {} as {}", user.id, account.role.as_str());
    Ok((user, token))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::routes::test_support::{app, register, send};

    fn request() -> RegistrationRequest {
        RegistrationRequest {
            email: Some("Jane.Doe@Example.COM".to_string()),
            password: Some("Violet-Lantern-42".to_string()),
            full_name: Some("  Jane   van der Berg ".to_string()),
            role: Some("Provider".to_string()),
            tel: Some("  ".to_string()),
            gender: Some("female".to_string()),
            dob: Some("1990-04-12".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_request_is_normalized() {
        let account = request().validate().unwrap();
        assert_eq!(account.email, "Jane.Doe@example.com");
        assert_eq!(account.first_name, "Jane");
        assert_eq!(account.last_name, "van der Berg");
        assert_eq!(account.role, Role::Provider);
        assert_eq!(account.gender, Some(Gender::Female));
        assert_eq!(account.phone, None);
        assert_eq!(account.dob, NaiveDate::from_ymd_opt(1990, 4, 12));
    }

    #[test]
    fn test_name_falls_back_to_name_field_and_role_defaults_to_seeker() {
        let req = RegistrationRequest {
            full_name: None,
            name: Some("Kofi".to_string()),
            role: None,
            ..request()
        };
        let account = req.validate().unwrap();
        assert_eq!(account.first_name, "Kofi");
        assert_eq!(account.last_name, "");
        assert_eq!(account.role, Role::Seeker);
    }

    #[test]
    fn test_weak_password_is_a_field_error() {
        let req = RegistrationRequest {
            password: Some("1234".to_string()),
            ..request()
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.contains_key("password"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_collects_every_invalid_field() {
        let req = RegistrationRequest {
            email: Some("not-an-email".to_string()),
            role: Some("admin".to_string()),
            gender: Some("robot".to_string()),
            dob: Some("12/04/1990".to_string()),
            ..request()
        };
        let errors = req.validate().unwrap_err();
        for field in ["email", "role", "gender", "dob"] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_missing_email_and_password_are_required() {
        let errors = RegistrationRequest::default().validate().unwrap_err();
        let required = vec!["This field is required.".to_string()];
        assert_eq!(errors["email"], required);
        assert_eq!(errors["password"], required);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("a@B.io").as_deref(), Some("a@b.io"));
        assert_eq!(normalize_email("@b.io"), None);
        assert_eq!(normalize_email("plain"), None);
    }

    async fn users_with_email(pool: &PgPool, email: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_weak_password_creates_no_account(pool: PgPool) {
        let app = app(pool.clone());
        let payload = json!({ "email": "weak@seeker.test", "password": "1234" });

        let (status, body) = send(&app, "POST", "/users/register/", None, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["fields"]["password"].is_array(), "{body}");
        assert_eq!(users_with_email(&pool, "weak@seeker.test").await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_email_is_unique_regardless_of_case(pool: PgPool) {
        let app = app(pool.clone());
        register(&app, "dana@seeker.test", "seeker").await;

        let payload = json!({ "email": "Dana@SEEKER.test", "password": "Quiet-Harbor-77" });
        let (status, body) = send(&app, "POST", "/users/register/", None, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["fields"]["email"][0], EMAIL_TAKEN);
        assert_eq!(users_with_email(&pool, "dana@seeker.test").await, 1);
    }
}
