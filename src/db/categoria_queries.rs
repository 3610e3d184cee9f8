use crate::models::CategoryLabel;
use sqlx::{Executor, PgPool, Postgres};

/// Labels of `tipo_punto`, in declaration order
pub async fn list_categorias(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT e.enumlabel::text
        FROM pg_enum e
        JOIN pg_type t ON t.oid = e.enumtypid
        WHERE t.typname = 'tipo_punto'
        ORDER BY e.enumsortorder
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn categoria_existe<'e, E>(executor: E, label: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1
            FROM pg_enum e
            JOIN pg_type t ON t.oid = e.enumtypid
            WHERE t.typname = 'tipo_punto' AND e.enumlabel::text = $1
        )
        "#,
    )
    .bind(label)
    .fetch_one(executor)
    .await
}

/// Extend `tipo_punto` with a new label.
///
/// DDL cannot take bind parameters; the label is embedded as a literal and
/// its character set is restricted by [`CategoryLabel::parse`].
pub async fn add_categoria(pool: &PgPool, label: &CategoryLabel) -> Result<(), sqlx::Error> {
    let sql = format!("ALTER TYPE tipo_punto ADD VALUE IF NOT EXISTS '{}'", label.as_str());
    // Simple-query protocol, no prepared statement for DDL
    pool.execute(sql.as_str()).await?;
    Ok(())
}
