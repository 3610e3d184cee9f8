use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::categoria::CrearCategoria;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /categorias - Labels accepted as a point's `tipo`
pub async fn list_categorias(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>> {
    let categorias = queries::list_categorias(&state.db_pool).await?;
    Ok(Json(categorias))
}

/// POST /categorias - Extend the set of point categories
pub async fn create_categoria(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CrearCategoria>,
) -> Result<(StatusCode, Json<Value>)> {
    let label = body.validate()?;

    if queries::categoria_existe(&state.db_pool, label.as_str()).await? {
        return Err(AppError::Conflict(format!(
            "La categoría '{}' ya existe",
            label
        )));
    }

    queries::add_categoria(&state.db_pool, &label).await?;

    tracing::info!(categoria = %label, "Point category added");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "mensaje": "Categoría añadida correctamente",
            "categoria": label.as_str(),
        })),
    ))
}
