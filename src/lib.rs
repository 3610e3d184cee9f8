// Library exports for testing and reusability

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use sqlx::PgPool;

/// Shared, read-only state handed to every handler
pub struct AppState {
    pub db_pool: PgPool,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
}
