use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::AppError;

pub const MIN_CREDENTIAL_LEN: usize = 8;

pub fn check_strength(credential: &str) -> Result<(), AppError> {
    if credential.chars().count() < MIN_CREDENTIAL_LEN {
        return Err(AppError::BadRequest(format!(
            "Credential must be at least {MIN_CREDENTIAL_LEN} characters"
        )));
    }
    Ok(())
}

pub fn hash_credential(credential: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(credential.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Credential hashing failed: {e}")))
}

/// Argon2 compares digests in constant time.
pub fn verify_credential(credential: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::Internal(format!("Invalid stored hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(credential.as_bytes(), &parsed)
        .is_ok())
}
