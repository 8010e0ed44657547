use regex::Regex;

lazy_static::lazy_static! {
    /// Lowercase letters, numbers, and single hyphens between them.
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    /// Storage folder names: one path segment, no traversal.
    static ref FOLDER_REGEX: Regex = Regex::new(r"^[a-z0-9_-]{1,64}$").unwrap();
}

pub const MAX_EMAIL_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 100;
pub const MAX_NAME_LEN: usize = 100;
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// A rejected input, reported to the caller as a 400 with this message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LEN && EMAIL_REGEX.is_match(email)
}

pub fn is_valid_folder(folder: &str) -> bool {
    FOLDER_REGEX.is_match(folder)
}

/// Ratings outside 1..=5 are pulled to the nearest bound; missing means 5.
pub fn clamp_rating(rating: Option<i32>) -> i32 {
    rating.unwrap_or(MAX_RATING).clamp(MIN_RATING, MAX_RATING)
}

/// Trims and maps empty strings to `None`, so clearing a field stores NULL.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Required text field: trimmed, non-empty, at most `max` characters.
pub fn required_text(field: &str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(trimmed.to_string())
}

/// Sign-in / sign-up schema. Returns the trimmed email.
pub fn validate_credentials(email: &str, password: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ValidationError::new("Email and password are required"));
    }
    if !is_valid_email(email) {
        return Err(ValidationError::new("Invalid email address"));
    }
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            "Password must be at least 6 characters",
        ));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(ValidationError::new(
            "Password must be at most 100 characters",
        ));
    }
    Ok(email.to_string())
}

pub fn validate_full_name(full_name: Option<String>) -> Result<Option<String>, ValidationError> {
    match blank_to_none(full_name) {
        Some(name) if name.chars().count() > MAX_NAME_LEN => Err(ValidationError::new(
            "Full name must be at most 100 characters",
        )),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_rules() {
        assert!(is_valid_slug("ceiling"));
        assert!(is_valid_slug("walls-and-decor"));
        assert!(!is_valid_slug("Walls"));
        assert!(!is_valid_slug("walls--decor"));
        assert!(!is_valid_slug("-walls"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("client@example.co.ke"));
        assert!(!is_valid_email("client@example"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email(&format!("{}@example.com", "a".repeat(250))));
    }

    #[test]
    fn test_folder_rules() {
        assert!(is_valid_folder("portfolio"));
        assert!(is_valid_folder("site_logo-2"));
        assert!(!is_valid_folder("../etc"));
        assert!(!is_valid_folder("a/b"));
        assert!(!is_valid_folder(""));
    }

    #[test]
    fn test_clamp_rating() {
        assert_eq!(clamp_rating(None), 5);
        assert_eq!(clamp_rating(Some(0)), 1);
        assert_eq!(clamp_rating(Some(3)), 3);
        assert_eq!(clamp_rating(Some(9)), 5);
    }

    #[test]
    fn test_blank_to_none() {
        assert_eq!(blank_to_none(Some("  ".to_string())), None);
        assert_eq!(blank_to_none(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(blank_to_none(None), None);
    }

    #[test]
    fn test_credentials_schema() {
        assert_eq!(
            validate_credentials("  admin@example.com ", "secret1"),
            Ok("admin@example.com".to_string())
        );
        assert!(validate_credentials("admin@example.com", "12345").is_err());
        assert!(validate_credentials("admin", "secret1").is_err());
        assert!(validate_credentials("", "").is_err());
        assert!(validate_credentials("admin@example.com", &"x".repeat(101)).is_err());
    }

    #[test]
    fn test_full_name_length() {
        assert_eq!(validate_full_name(None), Ok(None));
        assert!(validate_full_name(Some("n".repeat(101))).is_err());
    }
}
