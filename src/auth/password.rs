//! Password hashing for Doorlist managers.
//!
//! Uses PBKDF2-HMAC-SHA256 with a random 128-bit salt. Hashes and salts are
//! stored base64-encoded. Derivation is deterministic for a given password and
//! salt, so verification is a rehash plus a constant-time comparison.

use std::num::NonZeroU32;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use ring::pbkdf2;
use thiserror::Error;

use crate::DoorlistError;

/// PBKDF2 iteration count.
pub const PBKDF2_ITERATIONS: NonZeroU32 = match NonZeroU32::new(20_000) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};

/// Derived key length in bytes.
pub const HASH_LENGTH: usize = 64;

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;

/// Password-related errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PasswordError {
    /// Password is empty.
    #[error("password is required")]
    EmptyPassword,

    /// Salt is empty.
    #[error("salt is required")]
    EmptySalt,

    /// Expected hash is empty.
    #[error("password hash is required")]
    EmptyHash,

    /// Salt is not valid base64.
    #[error("salt is not valid base64")]
    InvalidSalt,
}

impl From<PasswordError> for DoorlistError {
    fn from(e: PasswordError) -> Self {
        DoorlistError::InvalidInput(e.to_string())
    }
}

/// A freshly hashed password together with the salt it was derived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword {
    /// Base64 derived key.
    pub hash: String,
    /// Base64 salt.
    pub salt: String,
}

/// Hash a password with a freshly generated salt.
///
/// # Examples
///
/// ```
/// use doorlist::auth::{hash_password, verify_password};
///
/// let hashed = hash_password("correct horse").unwrap();
/// assert!(verify_password("correct horse", &hashed.salt, &hashed.hash).unwrap());
/// ```
pub fn hash_password(password: &str) -> Result<HashedPassword, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::EmptyPassword);
    }

    let mut salt = [0u8; SALT_LENGTH];
    rand::rng().fill_bytes(&mut salt);
    let salt = STANDARD.encode(salt);

    let hash = rehash_password(password, &salt)?;
    Ok(HashedPassword { hash, salt })
}

/// Derive the hash of a password with an existing base64 salt.
pub fn rehash_password(password: &str, salt: &str) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::EmptyPassword);
    }
    if salt.is_empty() {
        return Err(PasswordError::EmptySalt);
    }

    let salt = STANDARD
        .decode(salt)
        .map_err(|_| PasswordError::InvalidSalt)?;

    let mut derived = [0u8; HASH_LENGTH];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        PBKDF2_ITERATIONS,
        &salt,
        password.as_bytes(),
        &mut derived,
    );
    Ok(STANDARD.encode(derived))
}

/// Check a password against a stored hash and salt.
pub fn verify_password(
    password: &str,
    salt: &str,
    expected_hash: &str,
) -> Result<bool, PasswordError> {
    if expected_hash.is_empty() {
        return Err(PasswordError::EmptyHash);
    }
    let actual = rehash_password(password, salt)?;
    Ok(constant_time_eq::constant_time_eq(
        actual.as_bytes(),
        expected_hash.as_bytes(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_SALT: &str = "MTIzNDU=";
    const FIXTURE_HASH: &str =
        "QdWDVNqxVM4pQ4RCoLsTjae4vOuC8EO7JwIPGHxZLmN3oLRBp8YvXRyeBvVCSf9wSJic+Jy45YKvViaWknRJmQ==";

    #[test]
    fn test_rehash_reproduces_known_hash() {
        assert_eq!(STANDARD.encode("12345"), FIXTURE_SALT);
        assert_eq!(rehash_password("password!", FIXTURE_SALT).unwrap(), FIXTURE_HASH);
    }

    #[test]
    fn test_rehash_is_deterministic() {
        let a = rehash_password("password!", FIXTURE_SALT).unwrap();
        let b = rehash_password("password!", FIXTURE_SALT).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("s3cret-pass").unwrap();
        assert!(verify_password("s3cret-pass", &hashed.salt, &hashed.hash).unwrap());
        assert!(!verify_password("s3cret-pasS", &hashed.salt, &hashed.hash).unwrap());
    }

    #[test]
    fn test_hash_uses_fresh_salt() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
        assert_eq!(STANDARD.decode(&a.salt).unwrap().len(), SALT_LENGTH);
        assert_eq!(STANDARD.decode(&a.hash).unwrap().len(), HASH_LENGTH);
    }

    #[test]
    fn test_old_hash_rejected_after_change() {
        let old = hash_password("first").unwrap();
        let new = hash_password("second").unwrap();
        assert!(!verify_password("second", &old.salt, &old.hash).unwrap());
        assert!(!verify_password("first", &new.salt, &new.hash).unwrap());
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(hash_password(""), Err(PasswordError::EmptyPassword));
        assert_eq!(rehash_password("pw", ""), Err(PasswordError::EmptySalt));
        assert_eq!(
            verify_password("pw", FIXTURE_SALT, ""),
            Err(PasswordError::EmptyHash)
        );
        assert_eq!(
            verify_password("", FIXTURE_SALT, FIXTURE_HASH),
            Err(PasswordError::EmptyPassword)
        );
    }

    #[test]
    fn test_invalid_salt() {
        assert_eq!(
            rehash_password("pw", "not base64!"),
            Err(PasswordError::InvalidSalt)
        );
    }

    #[test]
    fn test_error_converts_to_invalid_input() {
        let err: DoorlistError = PasswordError::EmptyPassword.into();
        assert_eq!(err.code(), "E_INVALID_INPUT");
    }
}
