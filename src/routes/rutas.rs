use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::ruta::{ActualizarRuta, AnadirPunto, CrearRuta, RUTA_COLUMNS};
use crate::models::{PuntoEnRuta, Ruta, RutaDetalle};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Ruta {} no encontrada", id))
}

/// GET /rutas
pub async fn list_rutas(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Ruta>>> {
    let rutas = queries::list_rutas(&state.db_pool).await?;
    Ok(Json(rutas))
}

/// GET /rutas/{id} - Route with its points in visiting order
pub async fn get_ruta(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<RutaDetalle>> {
    let ruta = queries::find_ruta_detalle(&state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(ruta))
}

/// GET /rutas/nombre/{nombre}
pub async fn search_rutas_by_nombre(
    State(state): State<Arc<AppState>>,
    Path(nombre): Path<String>,
) -> Result<Json<Vec<Ruta>>> {
    let rutas = queries::find_rutas_by_nombre(&state.db_pool, nombre.trim()).await?;
    Ok(Json(rutas))
}

/// POST /rutas - Create a route and compute its duration from the given points
pub async fn create_ruta(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CrearRuta>,
) -> Result<(StatusCode, Json<Value>)> {
    let nueva = body.validate()?;
    let ruta = queries::create_ruta(&state.db_pool, &nueva).await?;

    tracing::info!(
        id = ruta.ruta.id,
        puntos = ruta.puntos.len(),
        duracion = ruta.ruta.duracion,
        "Route created"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "mensaje": "Ruta creada correctamente",
            "ruta": ruta,
        })),
    ))
}

/// PATCH /rutas/{id} - Rename or describe a route. Duration is not editable.
pub async fn update_ruta(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<ActualizarRuta>,
) -> Result<Json<Value>> {
    let body = body.validate()?;
    let nombre = body.nombre.clone();

    let update = body.into_update();
    update.check()?;

    if let Some(ref nombre) = nombre {
        if queries::nombre_ruta_en_uso(&state.db_pool, nombre, Some(id)).await? {
            return Err(AppError::Conflict(format!(
                "Ya existe una ruta con el nombre '{}'",
                nombre
            )));
        }
    }

    let columns = update.columns();
    let ruta: Ruta = update
        .fetch_optional(&state.db_pool, id, RUTA_COLUMNS)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(id, ?columns, "Route updated");

    Ok(Json(json!({
        "mensaje": "Ruta actualizada correctamente",
        "ruta": ruta,
    })))
}

/// DELETE /rutas/{id}
pub async fn delete_ruta(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    if !queries::delete_ruta(&state.db_pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(id, "Route deleted");

    Ok(Json(json!({
        "mensaje": "Ruta eliminada correctamente",
    })))
}

/// GET /rutas/{id}/puntos
pub async fn list_puntos_de_ruta(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<PuntoEnRuta>>> {
    if queries::find_ruta_by_id(&state.db_pool, id).await?.is_none() {
        return Err(not_found(id));
    }
    let puntos = queries::puntos_de_ruta(&state.db_pool, id).await?;
    Ok(Json(puntos))
}

/// POST /rutas/{id}/puntos - Add a point and extend the duration incrementally
pub async fn add_punto(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<AnadirPunto>,
) -> Result<(StatusCode, Json<Value>)> {
    let (punto_id, orden) = body.validate()?;

    let ruta = queries::add_punto(&state.db_pool, id, punto_id, orden).await?;

    tracing::info!(
        ruta_id = id,
        punto_id,
        duracion = ruta.ruta.duracion,
        "Point added to route"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "mensaje": "Punto añadido a la ruta correctamente",
            "ruta": ruta,
        })),
    ))
}

/// DELETE /rutas/{id}/puntos/{punto_id} - Remove a point and shorten the duration
pub async fn remove_punto(
    State(state): State<Arc<AppState>>,
    Path((id, punto_id)): Path<(i32, i32)>,
) -> Result<Json<Value>> {
    let ruta = queries::remove_punto(&state.db_pool, id, punto_id).await?;

    tracing::info!(
        ruta_id = id,
        punto_id,
        duracion = ruta.ruta.duracion,
        "Point removed from route"
    );

    Ok(Json(json!({
        "mensaje": "Punto eliminado de la ruta correctamente",
        "ruta": ruta,
    })))
}

/// POST /rutas/{id}/duracion - Recompute the stored duration from scratch
pub async fn recompute_duracion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    let ruta = queries::recompute_ruta(&state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(id, duracion = ruta.ruta.duracion, "Route duration recomputed");

    Ok(Json(json!({
        "mensaje": "Duración recalculada correctamente",
        "ruta": ruta,
    })))
}
