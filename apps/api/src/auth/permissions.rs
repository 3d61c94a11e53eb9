//! Role and ownership rules shared by every mutating handler.
//!
//! These are pure functions over an already-resolved caller so the rules can
//! be tested without a database.

use super::extractor::AuthUser;
use crate::errors::AppError;
use crate::models::profile::ProfileRef;
use crate::models::user::{Role, User};

pub const NOT_ALLOWED: &str = "Not allowed.";

pub fn is_admin(user: &User) -> bool {
    user.is_active && user.is_staff
}

/// The caller must be a provider with an employer profile. Returns the employer id.
pub fn require_employer(caller: &AuthUser, denial: &str) -> Result<i64, AppError> {
    if caller.user.role() != Role::Provider {
        return Err(AppError::forbidden(denial));
    }
    caller
        .profile
        .employer_id()
        .ok_or_else(|| AppError::forbidden(denial))
}

pub fn require_seeker_role(caller: &AuthUser, denial: &str) -> Result<(), AppError> {
    if caller.user.role() == Role::Seeker {
        Ok(())
    } else {
        Err(AppError::forbidden(denial))
    }
}

/// Object-level check: the caller's employer must own the record's job.
pub fn ensure_owner(caller_employer_id: i64, owner_employer_id: i64) -> Result<(), AppError> {
    if caller_employer_id == owner_employer_id {
        Ok(())
    } else {
        Err(AppError::forbidden(NOT_ALLOWED))
    }
}

/// Only a superuser may change staff or superuser flags on any account.
pub fn ensure_can_set_privilege_flags(actor: &User, touches_flags: bool) -> Result<(), AppError> {
    if touches_flags && !actor.is_superuser {
        return Err(AppError::Validation(
            "Only superusers can modify staff/superuser flags.".to_string(),
        ));
    }
    Ok(())
}

/// Which application-linked records a caller may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    Employer(i64),
    Seeker(i64),
    Nothing,
}

/// Staff see everything unless they ask for their own records;
/// everybody else only ever sees records tied to their own profile.
pub fn list_scope(caller: &AuthUser, mine: bool) -> ListScope {
    if !mine && is_admin(&caller.user) {
        return ListScope::All;
    }
    match caller.profile {
        ProfileRef::Employer(id) => ListScope::Employer(id),
        ProfileRef::Seeker(id) => ListScope::Seeker(id),
        ProfileRef::Missing => ListScope::Nothing,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;

    use super::*;

    pub fn user(id: i64, role: Role) -> User {
        User {
            id,
            email: format!("user{id}@example.com"),
            password_hash: String::new(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role: role.as_str().to_string(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            phone: None,
            gender: None,
            dob: None,
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    pub fn caller(role: Role, profile: ProfileRef) -> AuthUser {
        AuthUser {
            user: user(1, role),
            profile,
        }
    }
}
