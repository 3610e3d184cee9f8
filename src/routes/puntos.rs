use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::punto::{ActualizarPunto, CrearPunto, TiposQuery};
use crate::models::Punto;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Punto de interés {} no encontrado", id))
}

/// Reject categories that are not labels of the enum, before the database does.
async fn ensure_categoria(pool: &PgPool, tipo: &str) -> Result<()> {
    if !queries::categoria_existe(pool, tipo).await? {
        return Err(AppError::InvalidRequest(format!(
            "Tipo de punto no válido: '{}'",
            tipo
        )));
    }
    Ok(())
}

/// GET /puntos - All points of interest
pub async fn list_puntos(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Punto>>> {
    let puntos = queries::list_puntos(&state.db_pool).await?;
    Ok(Json(puntos))
}

/// GET /puntos/{id}
pub async fn get_punto(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Punto>> {
    let punto = queries::find_punto_by_id(&state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(punto))
}

/// GET /puntos/tipo/{tipo}
pub async fn list_puntos_by_tipo(
    State(state): State<Arc<AppState>>,
    Path(tipo): Path<String>,
) -> Result<Json<Vec<Punto>>> {
    let tipos = vec![tipo.trim().to_lowercase()];
    let puntos = queries::find_puntos_by_tipos(&state.db_pool, &tipos).await?;
    Ok(Json(puntos))
}

/// GET /puntos/tipos?tipos=museo,parque - Points in any of several categories
pub async fn list_puntos_by_tipos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TiposQuery>,
) -> Result<Json<Vec<Punto>>> {
    let tipos = query.parse()?;
    let puntos = queries::find_puntos_by_tipos(&state.db_pool, &tipos).await?;

    tracing::debug!(?tipos, count = puntos.len(), "Points by categories");
    Ok(Json(puntos))
}

/// GET /puntos/nombre/{nombre} - Case-insensitive partial name search
pub async fn search_puntos_by_nombre(
    State(state): State<Arc<AppState>>,
    Path(nombre): Path<String>,
) -> Result<Json<Vec<Punto>>> {
    let puntos = queries::find_puntos_by_nombre(&state.db_pool, nombre.trim()).await?;
    Ok(Json(puntos))
}

/// POST /puntos
pub async fn create_punto(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CrearPunto>,
) -> Result<(StatusCode, Json<Value>)> {
    let nuevo = body.validate()?;
    ensure_categoria(&state.db_pool, &nuevo.tipo).await?;

    let punto = queries::insert_punto(&state.db_pool, &nuevo).await?;

    tracing::info!(id = punto.id, tipo = %punto.tipo, "Point of interest created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "mensaje": "Punto de interés creado correctamente",
            "punto": punto,
        })),
    ))
}

/// PATCH /puntos/{id} - Update only the fields present in the body
pub async fn update_punto(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<ActualizarPunto>,
) -> Result<Json<Value>> {
    let body = body.validate()?;
    if let Some(ref tipo) = body.tipo {
        ensure_categoria(&state.db_pool, tipo).await?;
    }

    let update = body.into_update();
    update.check()?;
    let columns = update.columns();

    let (punto, rutas) = queries::update_punto(&state.db_pool, id, update)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(id, ?columns, rutas_recalculadas = ?rutas, "Point of interest updated");

    Ok(Json(json!({
        "mensaje": "Punto de interés actualizado correctamente",
        "punto": punto,
    })))
}

/// DELETE /puntos/{id} - Detach events and routes, then delete the point
pub async fn delete_punto(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let borrado = queries::delete_punto(&state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        id,
        eventos = borrado.eventos_desvinculados,
        rutas = ?borrado.rutas_afectadas,
        "Point of interest deleted"
    );

    Ok(Json(json!({
        "mensaje": "Punto de interés eliminado correctamente",
        "eventos_desvinculados": borrado.eventos_desvinculados,
        "rutas_afectadas": borrado.rutas_afectadas,
    })))
}
