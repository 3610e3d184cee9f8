use crate::models::usuario::{Credenciales, NuevoUsuario, USUARIO_COLUMNS};
use crate::models::Usuario;
use sqlx::PgPool;

use super::like_pattern;

pub async fn list_usuarios(pool: &PgPool) -> Result<Vec<Usuario>, sqlx::Error> {
    let sql = format!("SELECT {USUARIO_COLUMNS} FROM usuarios ORDER BY id");
    sqlx::query_as::<_, Usuario>(&sql).fetch_all(pool).await
}

pub async fn find_usuario_by_id(pool: &PgPool, id: i32) -> Result<Option<Usuario>, sqlx::Error> {
    let sql = format!("SELECT {USUARIO_COLUMNS} FROM usuarios WHERE id = $1");
    sqlx::query_as::<_, Usuario>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_usuarios_by_nombre_usuario(
    pool: &PgPool,
    nombre_usuario: &str,
) -> Result<Vec<Usuario>, sqlx::Error> {
    let sql = format!(
        "SELECT {USUARIO_COLUMNS} FROM usuarios WHERE nombre_usuario ILIKE $1 ORDER BY nombre_usuario"
    );
    sqlx::query_as::<_, Usuario>(&sql)
        .bind(like_pattern(nombre_usuario))
        .fetch_all(pool)
        .await
}

pub async fn find_credenciales_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<Credenciales>, sqlx::Error> {
    sqlx::query_as::<_, Credenciales>("SELECT id, contrasena FROM usuarios WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_credenciales_by_id(
    pool: &PgPool,
    id: i32,
) -> Result<Option<Credenciales>, sqlx::Error> {
    sqlx::query_as::<_, Credenciales>("SELECT id, contrasena FROM usuarios WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Which unique fields (`nombre_usuario`, `email`) are already taken by a
/// user other than `excluir`.
pub async fn campos_en_uso(
    pool: &PgPool,
    nombre_usuario: Option<&str>,
    email: Option<&str>,
    excluir: Option<i32>,
) -> Result<Vec<&'static str>, sqlx::Error> {
    let (usuario_en_uso, email_en_uso): (bool, bool) = sqlx::query_as(
        r#"
        SELECT
            EXISTS(SELECT 1 FROM usuarios WHERE nombre_usuario = $1 AND id IS DISTINCT FROM $3),
            EXISTS(SELECT 1 FROM usuarios WHERE email = $2 AND id IS DISTINCT FROM $3)
        "#,
    )
    .bind(nombre_usuario)
    .bind(email)
    .bind(excluir)
    .fetch_one(pool)
    .await?;

    let mut en_uso = Vec::new();
    if usuario_en_uso {
        en_uso.push("nombre_usuario");
    }
    if email_en_uso {
        en_uso.push("email");
    }
    Ok(en_uso)
}

/// Insert a user. `contrasena_hash` must already be a bcrypt hash.
pub async fn insert_usuario(
    pool: &PgPool,
    usuario: &NuevoUsuario,
    contrasena_hash: &str,
) -> Result<Usuario, sqlx::Error> {
    let sql = format!(
        "INSERT INTO usuarios (nombre_usuario, nombre, apellido, email, contrasena, telefono)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {USUARIO_COLUMNS}"
    );
    sqlx::query_as::<_, Usuario>(&sql)
        .bind(&usuario.nombre_usuario)
        .bind(&usuario.nombre)
        .bind(&usuario.apellido)
        .bind(&usuario.email)
        .bind(contrasena_hash)
        .bind(&usuario.telefono)
        .fetch_one(pool)
        .await
}

pub async fn update_contrasena(
    pool: &PgPool,
    id: i32,
    contrasena_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE usuarios SET contrasena = $1 WHERE id = $2")
        .bind(contrasena_hash)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_usuario(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM usuarios WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
