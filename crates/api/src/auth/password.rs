//! Argon2id password hashing and the account password policy.
//!
//! Hashes are PHC strings, so parameters and salt travel with the hash.

use std::sync::LazyLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rankforge_core::error::CoreError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Upper bound on accepted input, keeping Argon2 work per request bounded.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Verified against when the login email is unknown, so both paths cost one
/// Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("rankforge-dummy-password").ok());

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on a mismatch; `Err` only for a malformed stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Burn one verification for a login attempt against an unknown email.
pub fn verify_against_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

/// Length bounds, and the password may not be the email or its local part.
pub fn check_password_policy(password: &str, email: &str) -> Result<(), CoreError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters long"
        )));
    }

    let email = email.trim().to_lowercase();
    let local_part = email.split('@').next().unwrap_or_default();
    let candidate = password.to_lowercase();
    if candidate == email || candidate == local_part {
        return Err(CoreError::Validation(
            "Password must not match your email address".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct-horse-battery-staple").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-battery-staple", &hash).unwrap());
        assert!(!verify_password("wrong-horse", &hash).unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn policy_enforces_length_bounds() {
        assert_matches!(
            check_password_policy("short", "a@example.com"),
            Err(CoreError::Validation(msg)) if msg.contains("at least 8")
        );
        let long = "x".repeat(MAX_PASSWORD_LENGTH + 1);
        assert_matches!(
            check_password_policy(&long, "a@example.com"),
            Err(CoreError::Validation(_))
        );
        assert!(check_password_policy("eightchr", "a@example.com").is_ok());
    }

    #[test]
    fn policy_rejects_email_derived_passwords() {
        assert!(check_password_policy("Marketing@Example.com", "marketing@example.com").is_err());
        assert!(check_password_policy("MARKETING", "marketing@example.com").is_err());
        assert!(check_password_policy("marketing-2026", "marketing@example.com").is_ok());
    }
}
