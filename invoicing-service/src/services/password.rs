//! Argon2 password hashing for dashboard users.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use secrecy::{ExposeSecret, Secret};

/// Hash a password into a PHC string (Argon2id, random salt).
pub fn hash_password(password: &Secret<String>) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

/// Check `password` against a stored PHC string.
///
/// A malformed stored hash counts as a mismatch.
pub fn password_matches(password: &Secret<String>, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        tracing::warn!("Stored password hash is not a valid PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> Secret<String> {
        Secret::new(s.to_string())
    }

    #[test]
    fn hash_is_argon2_phc_string() {
        let hash = hash_password(&secret("123456")).expect("Failed to hash password");
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn matching_and_mismatching_passwords() {
        let hash = hash_password(&secret("123456")).expect("Failed to hash password");
        assert!(password_matches(&secret("123456"), &hash));
        assert!(!password_matches(&secret("654321"), &hash));
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!password_matches(&secret("123456"), "plain-text"));
    }
}
