/// Local password credentials
///
/// Passwords for local accounts are hashed with Argon2id (19 MiB, 2 passes,
/// 1 lane) and stored in PHC string format, so parameters travel with the
/// hash. Accounts provisioned through SSO have no hash at all and can never
/// log in with a password; [`verify_stored_password`] treats that case as a
/// plain mismatch.
///
/// # Example
///
/// ```
/// use taskflow_shared::auth::password::{hash_password, verify_stored_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Corr3ct-horse")?;
/// assert!(verify_stored_password("Corr3ct-horse", Some(&hash))?);
/// assert!(!verify_stored_password("Corr3ct-horse", None)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Reasons a new password is refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeakPassword {
    #[error("Password must be at least 8 characters long")]
    TooShort,

    #[error("Password must contain both letters and digits")]
    MissingCharacterClass,

    #[error("Password must not be the same as the username")]
    MatchesUsername,
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(19 * 1024, 2, 1, Some(32))
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Checks a password against a PHC hash in constant time
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Like [`verify_password`], but an account without a usable password never matches
pub fn verify_stored_password(password: &str, stored: Option<&str>) -> Result<bool, PasswordError> {
    match stored {
        Some(hash) => verify_password(password, hash),
        None => Ok(false),
    }
}

/// Rejects passwords that are too easy to guess
pub fn check_password_strength(password: &str, username: &str) -> Result<(), WeakPassword> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(WeakPassword::TooShort);
    }

    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_letter && has_digit) {
        return Err(WeakPassword::MissingCharacterClass);
    }

    if password.eq_ignore_ascii_case(username) {
        return Err(WeakPassword::MatchesUsername);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_argon2id_phc_format() {
        let hash = hash_password("s3cret-pass").unwrap();

        assert!(hash.starts_with("$argon2id$v=19$"));
        assert!(hash.contains("m=19456,t=2,p=1"));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let a = hash_password("same-passw0rd").unwrap();
        let b = hash_password("same-passw0rd").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("right-passw0rd").unwrap();

        assert!(verify_password("right-passw0rd", &hash).unwrap());
        assert!(!verify_password("wrong-passw0rd", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("x", "not-a-hash").is_err());
        assert!(verify_password("x", "$argon2id$broken").is_err());
    }

    #[test]
    fn test_account_without_password_never_matches() {
        assert!(!verify_stored_password("anything1", None).unwrap());
        assert!(!verify_stored_password("", None).unwrap());
    }

    #[test]
    fn test_strength_rules() {
        assert_eq!(check_password_strength("ab1", "u"), Err(WeakPassword::TooShort));
        assert_eq!(
            check_password_strength("onlyletters", "u"),
            Err(WeakPassword::MissingCharacterClass)
        );
        assert_eq!(
            check_password_strength("12345678", "u"),
            Err(WeakPassword::MissingCharacterClass)
        );
        assert_eq!(
            check_password_strength("Ada12345", "ada12345"),
            Err(WeakPassword::MatchesUsername)
        );
        assert!(check_password_strength("tr0ub4dor-and-3", "ada").is_ok());
    }
}
