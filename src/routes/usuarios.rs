use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::usuario::{
    ActualizarUsuario, CambiarContrasena, CrearUsuario, Login, USUARIO_COLUMNS,
};
use crate::models::Usuario;
use crate::services::credentials;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Usuario {} no encontrado", id))
}

fn conflict(campos: &[&str]) -> AppError {
    AppError::Conflict(format!("Ya existe un usuario con ese {}", campos.join(" y ")))
}

/// GET /usuarios
pub async fn list_usuarios(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Usuario>>> {
    let usuarios = queries::list_usuarios(&state.db_pool).await?;
    Ok(Json(usuarios))
}

/// GET /usuarios/{id}
pub async fn get_usuario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Usuario>> {
    let usuario = queries::find_usuario_by_id(&state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(usuario))
}

/// GET /usuarios/nombre/{nombre_usuario}
pub async fn search_usuarios_by_nombre(
    State(state): State<Arc<AppState>>,
    Path(nombre_usuario): Path<String>,
) -> Result<Json<Vec<Usuario>>> {
    let usuarios =
        queries::find_usuarios_by_nombre_usuario(&state.db_pool, nombre_usuario.trim()).await?;
    Ok(Json(usuarios))
}

/// POST /usuarios - Register a user, storing only a bcrypt hash of the password
pub async fn create_usuario(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CrearUsuario>,
) -> Result<(StatusCode, Json<Value>)> {
    let nuevo = body.validate()?;

    let en_uso = queries::campos_en_uso(
        &state.db_pool,
        Some(nuevo.nombre_usuario.as_str()),
        Some(nuevo.email.as_str()),
        None,
    )
    .await?;
    if !en_uso.is_empty() {
        return Err(conflict(&en_uso));
    }

    let hash = credentials::hash_password(nuevo.contrasena.clone(), state.bcrypt_cost).await?;
    let usuario = queries::insert_usuario(&state.db_pool, &nuevo, &hash).await?;

    tracing::info!(id = usuario.id, nombre_usuario = %usuario.nombre_usuario, "User created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "mensaje": "Usuario creado correctamente",
            "usuario": usuario,
        })),
    ))
}

/// PATCH /usuarios/{id}
pub async fn update_usuario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<ActualizarUsuario>,
) -> Result<Json<Value>> {
    let body = body.validate()?;
    let nombre_usuario = body.nombre_usuario.clone();
    let email = body.email.clone();

    let update = body.into_update();
    update.check()?;

    let en_uso = queries::campos_en_uso(
        &state.db_pool,
        nombre_usuario.as_deref(),
        email.as_deref(),
        Some(id),
    )
    .await?;
    if !en_uso.is_empty() {
        return Err(conflict(&en_uso));
    }

    let columns = update.columns();
    let usuario: Usuario = update
        .fetch_optional(&state.db_pool, id, USUARIO_COLUMNS)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(id, ?columns, "User updated");

    Ok(Json(json!({
        "mensaje": "Usuario actualizado correctamente",
        "usuario": usuario,
    })))
}

/// PUT /usuarios/{id}/contrasena - Change password after checking the current one
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<CambiarContrasena>,
) -> Result<Json<Value>> {
    let (actual, nueva) = body.validate()?;

    let credenciales = queries::find_credenciales_by_id(&state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    credentials::check_password(actual, credenciales.contrasena).await?;

    let hash = credentials::hash_password(nueva, state.bcrypt_cost).await?;
    if !queries::update_contrasena(&state.db_pool, id, &hash).await? {
        return Err(not_found(id));
    }

    tracing::info!(id, "User password changed");

    Ok(Json(json!({
        "mensaje": "Contraseña actualizada correctamente",
    })))
}

/// POST /usuarios/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Login>,
) -> Result<Json<Value>> {
    let (email, contrasena) = body.validate()?;

    let credenciales = queries::find_credenciales_by_email(&state.db_pool, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    if let Err(e) = credentials::check_password(contrasena, credenciales.contrasena).await {
        tracing::info!(id = credenciales.id, "Login rejected");
        return Err(e);
    }

    let usuario = queries::find_usuario_by_id(&state.db_pool, credenciales.id)
        .await?
        .ok_or_else(|| not_found(credenciales.id))?;

    tracing::info!(id = usuario.id, "User logged in");

    Ok(Json(json!({
        "mensaje": "Inicio de sesión correcto",
        "usuario": usuario,
    })))
}

/// DELETE /usuarios/{id}
pub async fn delete_usuario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    if !queries::delete_usuario(&state.db_pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(id, "User deleted");

    Ok(Json(json!({
        "mensaje": "Usuario eliminado correctamente",
    })))
}
