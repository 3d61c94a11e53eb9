use chrono::{Duration, Utc};
use sqlx::{PgExecutor, PgPool};

use super::crypto::{generate_token, hash_token};
use crate::models::user::User;

const SESSION_DAYS: i64 = 30;

/// Issues a new bearer token for the user and stores its digest.
pub async fn create_session<'e, E>(executor: E, user_id: i64) -> Result<String, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let token = generate_token();
    let expires_at = Utc::now() + Duration::days(SESSION_DAYS);

    sqlx::query("INSERT INTO sessions (user_id, token_hash, expires_at) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(hash_token(&token))
        .bind(expires_at)
        .execute(executor)
        .await?;

    Ok(token)
}

/// Resolves an unexpired token to its active user.
pub async fn user_from_token(pool: &PgPool, token: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.*
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token_hash = $1 AND s.expires_at > NOW() AND u.is_active
        "#,
    )
    .bind(hash_token(token))
    .fetch_optional(pool)
    .await
}
