//! Account creation and credential verification.
//!
//! Passwords are stored as sha-256 over a per-user random salt plus the
//! password, both hex-encoded. Verification recomputes the digest and
//! compares; there is no password recovery path in this service.

use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::roles::Role;
use crate::services::session::bytes_to_hex;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let mut parts = normalized.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Some(normalized),
        _ => None,
    }
}

#[must_use]
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[must_use]
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

#[must_use]
pub fn verify_password(salt: &str, expected_hash: &str, password: &str) -> bool {
    hash_password(salt, password) == expected_hash
}

/// Identity returned from a successful credential check.
#[derive(Debug, Clone, Copy)]
pub struct LoginUser {
    pub id: Uuid,
    pub role: Role,
}

/// Create a user account, returning the new user ID.
pub async fn create_account(
    pool: &PgPool,
    email: &str,
    name: &str,
    password: &str,
    role: Role,
) -> Result<Uuid, AccountError> {
    let normalized = normalize_email(email).ok_or(AccountError::InvalidEmail)?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AccountError::WeakPassword);
    }

    let salt = generate_salt();
    let hash = hash_password(&salt, password);

    let row = sqlx::query(
        r"INSERT INTO users (email, name, role, password_salt, password_hash)
          VALUES ($1, $2, $3, $4, $5)
          ON CONFLICT (email) DO NOTHING
          RETURNING id",
    )
    .bind(&normalized)
    .bind(name.trim())
    .bind(role.as_str())
    .bind(&salt)
    .bind(&hash)
    .fetch_optional(pool)
    .await?;

    row.map(|r| r.get("id")).ok_or(AccountError::EmailTaken)
}

/// Verify email + password, returning the user's identity.
///
/// Unknown email and wrong password both map to `InvalidCredentials` so the
/// response does not reveal which field was wrong.
pub async fn verify_login(pool: &PgPool, email: &str, password: &str) -> Result<LoginUser, AccountError> {
    let normalized = normalize_email(email).ok_or(AccountError::InvalidCredentials)?;

    let row = sqlx::query("SELECT id, role, password_salt, password_hash FROM users WHERE email = $1")
        .bind(&normalized)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Err(AccountError::InvalidCredentials);
    };

    let salt: String = row.get("password_salt");
    let hash: String = row.get("password_hash");
    if !verify_password(&salt, &hash, password) {
        return Err(AccountError::InvalidCredentials);
    }

    let role = row
        .get::<String, _>("role")
        .parse::<Role>()
        .map_err(|_| AccountError::InvalidCredentials)?;

    Ok(LoginUser { id: row.get("id"), role })
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
