use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::evento::{parse_fecha, ActualizarEvento, CrearEvento};
use crate::models::EventoConPunto;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Evento {} no encontrado", id))
}

/// GET /eventos - All events, each with its point embedded
pub async fn list_eventos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EventoConPunto>>> {
    let eventos = queries::list_eventos(&state.db_pool).await?;
    Ok(Json(eventos))
}

/// GET /eventos/{id}
pub async fn get_evento(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<EventoConPunto>> {
    let evento = queries::find_evento_con_punto(&state.db_pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(evento))
}

/// GET /eventos/tipo/{tipo}
pub async fn list_eventos_by_tipo(
    State(state): State<Arc<AppState>>,
    Path(tipo): Path<String>,
) -> Result<Json<Vec<EventoConPunto>>> {
    let eventos = queries::find_eventos_by_tipo(&state.db_pool, tipo.trim()).await?;
    Ok(Json(eventos))
}

/// GET /eventos/nombre/{nombre}
pub async fn search_eventos_by_nombre(
    State(state): State<Arc<AppState>>,
    Path(nombre): Path<String>,
) -> Result<Json<Vec<EventoConPunto>>> {
    let eventos = queries::find_eventos_by_nombre(&state.db_pool, nombre.trim()).await?;
    Ok(Json(eventos))
}

/// GET /eventos/fecha/{fecha} - Events running on a given day (AAAA-MM-DD)
pub async fn list_eventos_by_fecha(
    State(state): State<Arc<AppState>>,
    Path(fecha): Path<String>,
) -> Result<Json<Vec<EventoConPunto>>> {
    let fecha = parse_fecha(fecha.trim())?;
    let eventos = queries::find_eventos_en_fecha(&state.db_pool, fecha).await?;

    tracing::debug!(%fecha, count = eventos.len(), "Events by date");
    Ok(Json(eventos))
}

/// POST /eventos
pub async fn create_evento(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CrearEvento>,
) -> Result<(StatusCode, Json<Value>)> {
    let nuevo = body.validate()?;
    let evento = queries::insert_evento(&state.db_pool, &nuevo).await?;

    tracing::info!(id = evento.id, punto_id = ?evento.punto_id, "Event created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "mensaje": "Evento creado correctamente",
            "evento": evento,
        })),
    ))
}

/// PATCH /eventos/{id}
pub async fn update_evento(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(body): Json<ActualizarEvento>,
) -> Result<Json<Value>> {
    let body = body.validate()?;
    let fechas = body.fechas();
    let punto_id = body.punto_id;

    let update = body.into_update();
    update.check()?;
    let columns = update.columns();

    let evento = queries::update_evento(&state.db_pool, id, update, fechas, punto_id)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(id, ?columns, "Event updated");

    Ok(Json(json!({
        "mensaje": "Evento actualizado correctamente",
        "evento": evento,
    })))
}

/// DELETE /eventos/{id}
pub async fn delete_evento(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<Value>> {
    if !queries::delete_evento(&state.db_pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(id, "Event deleted");

    Ok(Json(json!({
        "mensaje": "Evento eliminado correctamente",
    })))
}
