//! Password strength rules applied at registration and admin account creation.

const MIN_LENGTH: usize = 8;

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "welcome1",
    "letmein1",
    "abc12345",
    "admin123",
    "passw0rd",
    "trustno1",
    "superman",
    "starwars",
    "whatever",
    "dragon123",
    "monkey123",
    "11111111",
    "00000000",
    "azertyuiop",
    "changeme",
];

/// Checks a candidate password and returns every failed rule as a message.
///
/// `attributes` are `(label, value)` pairs describing the account, e.g.
/// `("email", "jane@example.com")`; a password that contains (or is
/// contained in) one of their parts is rejected as too similar.
pub fn validate_password(password: &str, attributes: &[(&str, &str)]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let lowered = password.to_lowercase();

    if password.chars().count() < MIN_LENGTH {
        errors.push(format!(
            "This password is too short. It must contain at least {MIN_LENGTH} characters."
        ));
    }

    if let Some((label, _)) = attributes
        .iter()
        .find(|(_, value)| is_similar(&lowered, value))
    {
        errors.push(format!("The password is too similar to the {label}."));
    }

    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        errors.push("This password is too common.".to_string());
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("This password is entirely numeric.".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_similar(password: &str, attribute: &str) -> bool {
    attribute
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| part.len() >= 4)
        .any(|part| {
            password.contains(part) || (password.len() >= 4 && part.contains(password))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password_passes() {
        let attributes = [("email", "jane@example.com")];
        assert!(validate_password("Tr0ub4dor&3x", &attributes).is_ok());
    }

    #[test]
    fn test_too_short() {
        let errors = validate_password("a1b2", &[]).unwrap_err();
        assert!(errors[0].contains("too short"));
    }

    #[test]
    fn test_entirely_numeric_and_common() {
        let errors = validate_password("12345678", &[]).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("too common")));
        assert!(errors.iter().any(|e| e.contains("entirely numeric")));
    }

    #[test]
    fn test_common_is_case_insensitive() {
        let errors = validate_password("PassWord", &[]).unwrap_err();
        assert_eq!(errors, vec!["This password is too common.".to_string()]);
    }

    #[test]
    fn test_similar_to_email_local_part() {
        let errors =
            validate_password("janedoe2024!", &[("email", "janedoe@example.com")]).unwrap_err();
        assert_eq!(
            errors,
            vec!["The password is too similar to the email.".to_string()]
        );
    }

    #[test]
    fn test_short_attribute_parts_are_ignored() {
        let attributes = [("first name", "Al")];
        assert!(validate_password("Quiet-Harbor-77", &attributes).is_ok());
    }
}
