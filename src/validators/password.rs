use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Configuration for password validation rules.
///
/// The default policy is the service-wide rule: 8 to 64 bytes containing an
/// uppercase letter, a lowercase letter, a digit and a punctuation or symbol
/// character.
///
/// # Examples
///
/// ```
/// use vira_id::validators::PasswordPolicy;
///
/// let policy = PasswordPolicy::default();
/// assert!(policy.validate("Str0ng!Pass").is_ok());
/// assert!(policy.validate("weakpass").is_err());
///
/// // A relaxed policy for legacy imports
/// let legacy = PasswordPolicy::new().allow_missing_symbol();
/// assert!(legacy.validate("Str0ngPass").is_ok());
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum password length in bytes (default: 8)
    pub min_length: usize,
    /// Maximum password length in bytes (default: 64)
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    /// Require at least one punctuation or symbol character
    pub require_symbol: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 64,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_symbol: true,
        }
    }
}

impl PasswordPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn min(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    #[must_use]
    pub fn max(mut self, len: usize) -> Self {
        self.max_length = len;
        self
    }

    #[must_use]
    pub fn allow_missing_symbol(mut self) -> Self {
        self.require_symbol = false;
        self
    }

    /// Validates a password against this policy.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::WeakPassword` if any rule is violated.
    pub fn validate(&self, password: &str) -> Result<(), ValidationError> {
        if password.len() < self.min_length || password.len() > self.max_length {
            return Err(ValidationError::WeakPassword);
        }

        let classes = CharClasses::of(password);

        if (self.require_uppercase && !classes.upper)
            || (self.require_lowercase && !classes.lower)
            || (self.require_digit && !classes.digit)
            || (self.require_symbol && !classes.symbol)
        {
            return Err(ValidationError::WeakPassword);
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
struct CharClasses {
    upper: bool,
    lower: bool,
    digit: bool,
    symbol: bool,
}

impl CharClasses {
    fn of(password: &str) -> Self {
        let mut classes = Self::default();
        for c in password.chars() {
            if c.is_uppercase() {
                classes.upper = true;
            } else if c.is_lowercase() {
                classes.lower = true;
            } else if c.is_numeric() {
                classes.digit = true;
            } else if is_symbol(c) {
                classes.symbol = true;
            }
        }
        classes
    }
}

/// Punctuation or symbol: ASCII punctuation plus any other visible non-alphanumeric character.
fn is_symbol(c: char) -> bool {
    c.is_ascii_punctuation()
        || (!c.is_ascii() && !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control())
}

/// Validates a password using the default policy.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    PasswordPolicy::default().validate(password)
}
