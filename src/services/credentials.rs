//! Password hashing and verification with bcrypt.
//!
//! Hashing is CPU-bound and runs on the blocking thread pool.

use crate::error::{AppError, Result};

pub async fn hash_password(plain: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))?
        .map_err(AppError::from)
}

pub async fn verify_password(plain: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("password verification task failed: {}", e)))?
        .map_err(AppError::from)
}

/// Verify `plain` against `hash`, failing with `Unauthorized` on mismatch.
pub async fn check_password(plain: String, hash: String) -> Result<()> {
    if verify_password(plain, hash).await? {
        Ok(())
    } else {
        Err(AppError::Unauthorized("Contraseña incorrecta".to_string()))
    }
}
