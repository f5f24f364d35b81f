use crate::error::AppError;
use rand::rngs::OsRng;
use std::sync::LazyLock;
use scrypt::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use tracing::error;

// N = 2^14, r = 8, p = 1, 64-byte key.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const SCRYPT_KEY_LEN: usize = 64;

pub const MIN_PASSWORD_LEN: usize = 8;

// Verified against when the account does not exist, so both login paths pay for one scrypt run.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| hash_password("no-such-account-0").ok());

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, SCRYPT_KEY_LEN).map_err(|e| {
        error!("Invalid scrypt params: {}", e);
        AppError::Internal
    })?;
    let salt = SaltString::generate(&mut OsRng);

    Scrypt
        .hash_password_customized(password.as_bytes(), None, None, params, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            AppError::Internal
        })
}

/// Constant-time comparison happens inside the verifier.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        error!("Stored password hash is malformed: {}", e);
        AppError::Internal
    })?;

    Ok(Scrypt.verify_password(password.as_bytes(), &parsed).is_ok())
}

/// Verifies a login attempt. A missing account still runs the verifier
/// against a throwaway hash and always fails.
pub fn verify_login(password: &str, stored_hash: Option<&str>) -> Result<bool, AppError> {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(password, dummy);
            }
            Ok(false)
        }
    }
}

pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_upper && has_lower && has_digit) {
        return Err(AppError::Validation(
            "Password must contain an uppercase letter, a lowercase letter and a digit".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::Validation("Invalid email address".into()))
    }
}
