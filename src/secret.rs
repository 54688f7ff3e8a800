//! Redacting wrapper for passwords and tokens.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A string that never shows up in `Debug` or `Display` output.
///
/// Passwords and issued tokens travel through the crate in this wrapper so a
/// stray `{:?}` in a log line cannot leak them. Serialization does expose the
/// value, since token pairs have to reach the client.
///
/// ```rust
/// use vira_id::SecretString;
///
/// let refresh = SecretString::new("eyJhbGciOi...");
/// assert_eq!(format!("{refresh:?}"), "SecretString([REDACTED])");
/// assert_eq!(refresh.expose_secret(), "eyJhbGciOi...");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_are_redacted() {
        let secret = SecretString::new("Str0ng!Pass");
        assert_eq!(format!("{secret:?}"), "SecretString([REDACTED])");
        assert_eq!(format!("{secret}"), "[REDACTED]");
        assert!(!format!("{:?}", Some(&secret)).contains("Str0ng"));
    }

    #[test]
    fn test_serde_exposes_value() {
        let secret: SecretString = "refresh-token".into();
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"refresh-token\"");

        let restored: SecretString = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, secret);
    }
}
