use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Employer {
    pub id: i64,
    pub user_id: i64,
    pub company_name: String,
    pub company_website: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobSeeker {
    pub id: i64,
    pub user_id: i64,
    pub resume_url: String,
    pub resume_text: String,
    pub created_at: DateTime<Utc>,
}

/// Result of looking up the role profile attached to a user.
/// Absence is a normal state: profiles may be provisioned lazily.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileRef {
    Seeker(i64),
    Employer(i64),
    Missing,
}

impl ProfileRef {
    pub fn employer_id(self) -> Option<i64> {
        match self {
            ProfileRef::Employer(id) => Some(id),
            _ => None,
        }
    }

    pub fn seeker_id(self) -> Option<i64> {
        match self {
            ProfileRef::Seeker(id) => Some(id),
            _ => None,
        }
    }
}
