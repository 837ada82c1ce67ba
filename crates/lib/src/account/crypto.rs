//! Password hashing for accounts
//!
//! New passwords are hashed with Argon2id and stored as PHC strings. Record files written by
//! earlier deployments hold unsalted SHA-256 hex digests; those still verify.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core},
};
use sha2::{Digest, Sha256};

use super::errors::AccountError;
use crate::Result;

/// Length of a hex-encoded SHA-256 digest
const LEGACY_DIGEST_LENGTH: usize = 64;

/// Hash a password using Argon2id
///
/// # Returns
/// The Argon2 hash string (PHC format), salt included
pub fn hash_password(password: impl AsRef<str>) -> Result<String> {
    let salt = SaltString::generate(&mut rand_core::OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_ref().as_bytes(), &salt)
        .map_err(|e| AccountError::HashingFailed {
            reason: e.to_string(),
        })?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its stored digest
///
/// Accepts Argon2 PHC strings and legacy SHA-256 hex digests.
///
/// # Returns
/// Ok(()) if password is correct, `AccountError::InvalidCredentials` otherwise
pub fn verify_password(password: impl AsRef<str>, stored: impl AsRef<str>) -> Result<()> {
    let password = password.as_ref();
    let stored = stored.as_ref();

    if is_legacy_digest(stored) {
        let digest = hex::encode(Sha256::digest(password.as_bytes()));
        return if digest.eq_ignore_ascii_case(stored) {
            Ok(())
        } else {
            Err(AccountError::InvalidCredentials.into())
        };
    }

    let parsed_hash = PasswordHash::new(stored).map_err(|_| AccountError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AccountError::InvalidCredentials.into())
}

fn is_legacy_digest(stored: &str) -> bool {
    stored.len() == LEGACY_DIGEST_LENGTH && stored.bytes().all(|b| b.is_ascii_hexdigit())
}
