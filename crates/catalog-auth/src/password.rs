//! Password hashing, verification and strength policy

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

/// Shortest password accepted by [`validate_password_strength`]
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Passwords rejected outright no matter their length
const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "12345678", "123456789", "1234567890", "qwerty123", "qwertyuiop",
    "11111111", "iloveyou", "sunshine", "princess", "football", "baseball", "welcome1",
    "admin123", "letmein1", "abc12345", "00000000", "passw0rd", "superman",
];

/// Error types for password operations
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHashFormat(String),

    /// Password rejected by the strength policy; one message per failed rule
    #[error("Password too weak: {}", .0.join(" "))]
    TooWeak(Vec<String>),
}

/// Hash a password using Argon2id
///
/// Returns a PHC-formatted string (`$argon2id$v=19$m=19456,t=2,p=1$...`)
/// suitable for storage.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    // Use Argon2 with default params (Argon2id variant)
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a password against a PHC hash
///
/// `Ok(false)` means a wrong password; `Err` means the stored hash is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHashFormat(e.to_string()))?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
    }
}

/// Check a new password against the policy: minimum length, not entirely
/// numeric, not a well-known password and not similar to the username.
pub fn validate_password_strength(password: &str, username: &str) -> Result<(), PasswordError> {
    let mut problems = Vec::new();
    let lowered = password.to_lowercase();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        problems.push("This password is too common.".to_string());
    }
    let username = username.trim().to_lowercase();
    if !username.is_empty() && (lowered.contains(&username) || username.contains(&lowered)) {
        problems.push("The password is too similar to the username.".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(PasswordError::TooWeak(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_produces_valid_hash() {
        let hash = hash_password("TestPassword123!").expect("Failed to hash password");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
    }

    #[test]
    fn test_verify_password_correct_and_incorrect() {
        let hash = hash_password("CorrectPassword123!").expect("Failed to hash password");

        assert!(verify_password("CorrectPassword123!", &hash).unwrap());
        assert!(!verify_password("WrongPassword123!", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("AnyPassword", "invalid_hash_format");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat(_))));
    }

    #[test]
    fn test_hash_password_different_salts() {
        let hash1 = hash_password("SamePassword123!").unwrap();
        let hash2 = hash_password("SamePassword123!").unwrap();

        assert_ne!(hash1, hash2, "Hashes should differ due to random salts");
        assert!(verify_password("SamePassword123!", &hash1).unwrap());
        assert!(verify_password("SamePassword123!", &hash2).unwrap());
    }

    #[test]
    fn test_hash_password_unicode() {
        let password = "Пароль🔐надёжный";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_strength_accepts_reasonable_password() {
        assert!(validate_password_strength("tr0ub4dor&3", "manager").is_ok());
    }

    #[test]
    fn test_strength_rules() {
        let problems = |password: &str| match validate_password_strength(password, "manager") {
            Err(PasswordError::TooWeak(problems)) => problems,
            other => panic!("expected TooWeak, got {:?}", other),
        };

        assert_eq!(problems("short1").len(), 1);
        assert!(problems("12345678")
            .iter()
            .any(|p| p.contains("entirely numeric")));
        assert!(problems("Password").iter().any(|p| p.contains("too common")));
        assert!(problems("manager2024")
            .iter()
            .any(|p| p.contains("similar to the username")));
    }
}
