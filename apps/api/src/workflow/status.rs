//! Application status machine.
//!
//! `PENDING → REVIEW → ACCEPTED | REJECTED`. Re-asserting the current status
//! is accepted as a no-op; every other move is rejected.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationStatus {
    Pending,
    Review,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Review => "REVIEW",
            ApplicationStatus::Accepted => "ACCEPTED",
            ApplicationStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "PENDING" => Some(ApplicationStatus::Pending),
            "REVIEW" => Some(ApplicationStatus::Review),
            "ACCEPTED" => Some(ApplicationStatus::Accepted),
            "REJECTED" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }

    /// Parses a status value coming from a request, as a field error on `field`.
    pub fn parse_field(value: &str, field: &str) -> Result<Self, AppError> {
        Self::parse(value).ok_or_else(|| {
            AppError::field(
                "Invalid status",
                field,
                format!("\"{value}\" is not a valid choice."),
            )
        })
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected
        )
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use ApplicationStatus::*;
        self == next
            || matches!(
                (self, next),
                (Pending, Review) | (Review, Accepted) | (Review, Rejected)
            )
    }

    pub fn transition(self, next: Self) -> Result<Self, AppError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else if self.is_terminal() {
            Err(AppError::Validation(format!(
                "Application is already {} and cannot move to {}.",
                self.as_str(),
                next.as_str()
            )))
        } else {
            Err(AppError::Validation(format!(
                "Cannot move application from {} to {}.",
                self.as_str(),
                next.as_str()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;
    use super::*;

    #[test]
    fn test_forward_path_is_allowed() {
        assert_eq!(Pending.transition(Review).unwrap(), Review);
        assert_eq!(Review.transition(Accepted).unwrap(), Accepted);
        assert_eq!(Review.transition(Rejected).unwrap(), Rejected);
    }

    #[test]
    fn test_same_status_is_noop() {
        for s in [Pending, Review, Accepted, Rejected] {
            assert_eq!(s.transition(s).unwrap(), s);
        }
    }

    #[test]
    fn test_illegal_jumps_are_rejected() {
        for (from, to) in [
            (Pending, Accepted),
            (Pending, Rejected),
            (Review, Pending),
            (Accepted, Rejected),
            (Rejected, Review),
            (Accepted, Pending),
        ] {
            let err = from.transition(to).unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m.contains(from.as_str())));
        }
    }

    #[test]
    fn test_terminal_states_have_no_exit() {
        for s in [Accepted, Rejected] {
            assert!(s.is_terminal());
            for next in [Pending, Review, Accepted, Rejected] {
                assert_eq!(s.can_transition_to(next), s == next);
            }
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(ApplicationStatus::parse("review"), Some(Review));
        assert_eq!(ApplicationStatus::parse("done"), None);
        assert!(matches!(
            ApplicationStatus::parse_field("done", "status"),
            Err(AppError::FieldErrors { .. })
        ));
    }
}
