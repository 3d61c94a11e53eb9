use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use super::session::user_from_token;
use crate::accounts::profiles::lookup_profile;
use crate::errors::AppError;
use crate::models::profile::ProfileRef;
use crate::models::user::User;
use crate::state::AppState;

/// An authenticated caller together with its role profile, if one exists.
///
/// ```ignore
/// async fn handler(caller: AuthUser) -> Result<Json<Foo>, AppError> { ... }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub profile: ProfileRef,
}

/// Optional caller for endpoints that are readable anonymously.
/// A token that is present but invalid is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

/// An authenticated staff member.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

/// Pulls the token out of `Authorization: Bearer <token>` (or `Token <token>`).
/// `Ok(None)` means no header was sent at all.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AppError::Unauthorized)?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Token "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(Some)
        .ok_or(AppError::Unauthorized)
}

async fn resolve(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    let user = user_from_token(&state.db, token)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let profile = lookup_profile(&state.db, &user).await?;
    Ok(AuthUser { user, profile })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or(AppError::Unauthorized)?;
        resolve(state, token).await
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(MaybeUser(Some(resolve(state, token).await?))),
            None => Ok(MaybeUser(None)),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = AuthUser::from_request_parts(parts, state).await?;
        if !super::permissions::is_admin(&caller.user) {
            return Err(AppError::forbidden("Administrator privileges required."));
        }
        Ok(AdminUser(caller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_absent_header() {
        assert!(matches!(bearer_token(&parts_with(None)), Ok(None)));
    }

    #[test]
    fn test_bearer_token_accepts_bearer_and_token_schemes() {
        let bearer = parts_with(Some("Bearer abc"));
        assert_eq!(bearer_token(&bearer).unwrap(), Some("abc"));
        let token = parts_with(Some("Token xyz"));
        assert_eq!(bearer_token(&token).unwrap(), Some("xyz"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert!(matches!(
            bearer_token(&parts_with(Some("Basic dXNlcjpwdw=="))),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            bearer_token(&parts_with(Some("Bearer "))),
            Err(AppError::Unauthorized)
        ));
    }
}
