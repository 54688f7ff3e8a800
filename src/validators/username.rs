use regex::Regex;
use std::sync::LazyLock;

use super::ValidationError;

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,32}$").unwrap());

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::InvalidUsername);
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(ValidationError::InvalidUsername);
    }

    Ok(())
}
