//! Input helpers shared by handlers.

/// `?mine=1`, `?mine=true`, `?mine=yes` switch a flag on; absent, empty,
/// `0`, `false` and `no` leave it off.
pub fn is_truthy(value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_lowercase()) {
        None => false,
        Some(v) => !matches!(v.as_str(), "" | "0" | "false" | "no" | "off"),
    }
}

/// Trimmed value, or `None` when absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Tri-state boolean filter: only the literals `"true"` and `"false"` count.
pub fn tri_state(value: Option<&str>) -> Option<bool> {
    match value {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

/// Case-insensitive substring pattern for `LOWER(col) LIKE $n`.
/// Backslash, `%` and `_` in user input match literally.
pub fn contains_pattern(text: &str) -> String {
    let escaped = text
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank_trims_and_drops_empty() {
        assert_eq!(non_blank(Some("  Douala ")), Some("Douala"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(Some("1")));
        assert!(is_truthy(Some("True")));
        assert!(!is_truthy(Some("false")));
        assert!(!is_truthy(Some("")));
        assert!(!is_truthy(None));
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Rust"), "%rust%");
        assert_eq!(contains_pattern("_"), "%\\_%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_a"), "%a\\_a%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn test_tri_state_only_accepts_literals() {
        assert_eq!(tri_state(Some("true")), Some(true));
        assert_eq!(tri_state(Some("false")), Some(false));
        assert_eq!(tri_state(Some("TRUE")), None);
        assert_eq!(tri_state(Some("1")), None);
        assert_eq!(tri_state(None), None);
    }
}
