//! Password hashing and random token helpers.

use crate::AuthError;
use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};
use password_hash::{PasswordHash, PasswordHasher as ArgonPasswordHasher, SaltString};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Length of the account confirmation token in characters.
pub const CONFIRM_TOKEN_LENGTH: usize = 32;

/// Number of hex characters kept by [`token_fingerprint`].
const FINGERPRINT_LENGTH: usize = 12;

/// One-way password hashing with constant-time verification.
///
/// The default implementation is [`Argon2Hasher`].
///
/// ```rust
/// use vira_id::crypto::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::default();
/// let hash = hasher.hash("Str0ng!Pass").unwrap();
/// assert!(hasher.verify("Str0ng!Pass", &hash).unwrap());
/// assert!(!hasher.verify("wrong", &hash).unwrap());
/// ```
pub trait PasswordHasher: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHashError` if hashing fails.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Returns `Ok(false)` on mismatch.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHashError` if the stored hash is malformed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Argon2id hasher with configurable cost.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    /// Memory cost in KiB
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            memory_cost: 19456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Hasher {
    #[must_use]
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// 64 MiB, 3 iterations, 4 lanes.
    #[must_use]
    pub fn production() -> Self {
        Self::new(65536, 3, 4)
    }

    /// Cheapest valid parameters. Only for tests.
    #[must_use]
    pub fn insecure_fast() -> Self {
        Self::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST)
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|_| AuthError::PasswordHashError)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| AuthError::PasswordHashError)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHashError)?;

        // cost parameters come from the PHC string, not from self
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Generates a random alphanumeric token of `length` characters.
pub fn generate_token(length: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

/// Short SHA-256 fingerprint of a token, safe to put in logs.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut encoded = hex::encode(digest);
    encoded.truncate(FINGERPRINT_LENGTH);
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_length_and_charset() {
        let token = generate_token(CONFIRM_TOKEN_LENGTH);
        assert_eq!(token.len(), CONFIRM_TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_token(CONFIRM_TOKEN_LENGTH));
    }

    #[test]
    fn test_token_fingerprint() {
        let fp = token_fingerprint("some.jwt.token");
        assert_eq!(fp.len(), FINGERPRINT_LENGTH);
        assert_eq!(fp, token_fingerprint("some.jwt.token"));
        assert_ne!(fp, token_fingerprint("other.jwt.token"));
        assert!(!fp.contains("jwt"));
    }

    #[test]
    fn test_argon2_roundtrip_and_salting() {
        let hasher = Argon2Hasher::insecure_fast();
        let first = hasher.hash("Str0ng!Pass").unwrap();
        let second = hasher.hash("Str0ng!Pass").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("Str0ng!Pass", &first).unwrap());
        assert!(hasher.verify("Str0ng!Pass", &second).unwrap());
        assert!(!hasher.verify("str0ng!pass", &first).unwrap());
    }

    #[test]
    fn test_argon2_malformed_hash() {
        let hasher = Argon2Hasher::insecure_fast();
        assert_eq!(
            hasher.verify("Str0ng!Pass", "not-a-phc-string").unwrap_err(),
            AuthError::PasswordHashError
        );
    }
}
