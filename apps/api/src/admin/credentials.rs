//! Administrator credentials: PBKDF2-HMAC-SHA256 with a random 16-byte salt,
//! both stored base64-encoded.

use anyhow::anyhow;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::Utc;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::admin::AdminRow;

pub const PBKDF2_ROUNDS: u32 = 200_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const STAMP_LEN: usize = 9;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash_b64: String,
    pub salt_b64: String,
}

/// Hashes `password` with `salt`, or with a fresh random salt.
pub fn hash_password(password: &str, salt: Option<&[u8]>) -> PasswordHash {
    let salt = match salt {
        Some(salt) => salt.to_vec(),
        None => {
            let mut salt = vec![0u8; SALT_LEN];
            rand::thread_rng().fill_bytes(&mut salt);
            salt
        }
    };
    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ROUNDS, &mut hash);
    PasswordHash {
        hash_b64: STANDARD.encode(hash),
        salt_b64: STANDARD.encode(&salt),
    }
}

/// Constant-time check of `password` against a stored hash and salt.
/// Malformed stored values never verify.
pub fn verify_password(password: &str, hash_b64: &str, salt_b64: &str) -> bool {
    let (Ok(salt), Ok(expected)) = (STANDARD.decode(salt_b64), STANDARD.decode(hash_b64)) else {
        return false;
    };
    let mut hash = [0u8; HASH_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ROUNDS, &mut hash);
    hash[..].ct_eq(&expected[..]).into()
}

/// Short fingerprint of a stored hash. Embedded in the session cookie so a
/// password change invalidates sessions issued before it.
pub fn credential_stamp(pass_hash_b64: &str) -> String {
    URL_SAFE_NO_PAD.encode(&Sha256::digest(pass_hash_b64.as_bytes())[..STAMP_LEN])
}

/// Creates the administrator or replaces its password.
pub async fn upsert_admin(pool: &SqlitePool, username: &str, password: &str) -> Result<(), AppError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let owned = password.to_string();
    let hashed = tokio::task::spawn_blocking(move || hash_password(&owned, None))
        .await
        .map_err(|e| AppError::Internal(anyhow!("Password hashing task failed: {e}")))?;

    sqlx::query(
        r#"
        INSERT INTO admins (username, pass_hash, salt, created_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT(username) DO UPDATE SET pass_hash = excluded.pass_hash, salt = excluded.salt
        "#,
    )
    .bind(username)
    .bind(&hashed.hash_b64)
    .bind(&hashed.salt_b64)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    info!("Upserted administrator '{username}'");
    Ok(())
}

pub async fn verify_admin(pool: &SqlitePool, username: &str, password: &str) -> Result<bool, AppError> {
    let Some(row) = sqlx::query_as::<_, AdminRow>("SELECT pass_hash, salt FROM admins WHERE username = $1")
        .bind(username.trim())
        .fetch_optional(pool)
        .await?
    else {
        return Ok(false);
    };

    let owned = password.to_string();
    tokio::task::spawn_blocking(move || verify_password(&owned, &row.pass_hash, &row.salt))
        .await
        .map_err(|e| AppError::Internal(anyhow!("Password verification task failed: {e}")))
}

/// Current credential stamp of `username`, or `None` if the account is gone.
pub async fn current_credential_stamp(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<String>, AppError> {
    let pass_hash: Option<String> =
        sqlx::query_scalar("SELECT pass_hash FROM admins WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;
    Ok(pass_hash.as_deref().map(credential_stamp))
}

/// Creates the default `admin` account when no administrator exists yet.
/// Returns whether an account was created.
pub async fn bootstrap_default_admin(pool: &SqlitePool) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM admins")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(false);
    }

    upsert_admin(pool, DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD).await?;
    warn!("Created default administrator '{DEFAULT_ADMIN_USERNAME}'; change its password");
    Ok(true)
}
