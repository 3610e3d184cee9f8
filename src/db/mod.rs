use crate::config::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

mod categoria_queries;
mod evento_queries;
mod punto_queries;
mod ruta_queries;
pub mod update_builder;
mod usuario_queries;

/// Re-export all query functions under `queries`
pub mod queries {
    pub use super::categoria_queries::*;
    pub use super::evento_queries::*;
    pub use super::punto_queries::*;
    pub use super::ruta_queries::*;
    pub use super::usuario_queries::*;
}

pub use update_builder::{FieldValue, UpdateBuilder};

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// `ILIKE` pattern matching `fragment` anywhere, with wildcards in the
/// fragment itself taken literally.
pub(crate) fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
