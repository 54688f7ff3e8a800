use regex::Regex;
use std::sync::LazyLock;

use super::ValidationError;

/// Maximum email length (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail);
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }

    // the regex lets "a@b..com" through
    match email.split_once('@') {
        Some((_, domain)) if !domain.contains("..") => Ok(()),
        _ => Err(ValidationError::InvalidEmail),
    }
}
