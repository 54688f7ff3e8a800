//! Credential rules.
//!
//! Pure functions with no I/O. Registration runs [`validate_registration`];
//! password changes run [`validate_password`] (or a custom [`PasswordPolicy`]).

pub mod email;
pub mod password;
pub mod username;

pub use email::validate_email;
pub use password::{PasswordPolicy, validate_password};
pub use username::validate_username;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    InvalidUsername,
    WeakPassword,
    InvalidEmail,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUsername => write!(
                f,
                "Username must be 3-32 characters of latin letters, digits or underscores"
            ),
            Self::WeakPassword => write!(
                f,
                "Password must be 8-64 characters with an uppercase letter, a lowercase letter, a digit and a symbol"
            ),
            Self::InvalidEmail => write!(f, "Invalid email format"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Checks a username and password pair.
pub fn validate_credentials(username: &str, password: &str) -> Result<(), ValidationError> {
    validate_username(username)?;
    validate_password(password)
}

/// Checks everything a registration carries. An empty email counts as absent.
pub fn validate_registration(
    username: &str,
    password: &str,
    email: Option<&str>,
) -> Result<(), ValidationError> {
    validate_credentials(username, password)?;

    match email {
        Some(email) if !email.is_empty() => validate_email(email),
        _ => Ok(()),
    }
}
