use crate::db::update_builder::UpdateBuilder;
use crate::error::{AppError, Result as AppResult};
use crate::models::evento::{CambioFechas, NuevoEvento, EVENTO_COLUMNS};
use crate::models::{Evento, EventoConPunto};
use sqlx::{PgConnection, PgPool};
use time::Date;

use super::{like_pattern, punto_queries};

/// Events joined with their point, which is embedded as a JSON object.
const EVENTO_CON_PUNTO_SELECT: &str = r#"
    SELECT
        e.id,
        e.nombre,
        e.tipo,
        e.descripcion,
        e.imagen,
        e.fecha_ini,
        e.fecha_fin,
        e.enlace,
        e.punto_id,
        CASE WHEN p.id IS NULL THEN NULL ELSE json_build_object(
            'id', p.id,
            'nombre', p.nombre,
            'tipo', p.tipo,
            'latitud', p.latitud,
            'longitud', p.longitud,
            'descripcion', p.descripcion,
            'imagen', p.imagen
        ) END AS punto
    FROM eventos e
    LEFT JOIN puntos_interes p ON p.id = e.punto_id
"#;

pub async fn list_eventos(pool: &PgPool) -> Result<Vec<EventoConPunto>, sqlx::Error> {
    let sql = format!("{EVENTO_CON_PUNTO_SELECT} ORDER BY e.id");
    sqlx::query_as::<_, EventoConPunto>(&sql)
        .fetch_all(pool)
        .await
}

pub async fn find_evento_con_punto(
    pool: &PgPool,
    id: i32,
) -> Result<Option<EventoConPunto>, sqlx::Error> {
    let sql = format!("{EVENTO_CON_PUNTO_SELECT} WHERE e.id = $1");
    sqlx::query_as::<_, EventoConPunto>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

async fn lock_evento(conn: &mut PgConnection, id: i32) -> Result<Option<Evento>, sqlx::Error> {
    let sql = format!("SELECT {EVENTO_COLUMNS} FROM eventos WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, Evento>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Key-share lock on the point an event is about to reference.
async fn ensure_punto(conn: &mut PgConnection, punto_id: i32) -> AppResult<()> {
    if punto_queries::lock_punto(conn, punto_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Punto de interés {} no encontrado",
            punto_id
        )));
    }
    Ok(())
}

pub async fn find_eventos_by_tipo(
    pool: &PgPool,
    tipo: &str,
) -> Result<Vec<EventoConPunto>, sqlx::Error> {
    let sql = format!("{EVENTO_CON_PUNTO_SELECT} WHERE lower(e.tipo) = lower($1) ORDER BY e.id");
    sqlx::query_as::<_, EventoConPunto>(&sql)
        .bind(tipo)
        .fetch_all(pool)
        .await
}

pub async fn find_eventos_by_nombre(
    pool: &PgPool,
    nombre: &str,
) -> Result<Vec<EventoConPunto>, sqlx::Error> {
    let sql = format!("{EVENTO_CON_PUNTO_SELECT} WHERE e.nombre ILIKE $1 ORDER BY e.nombre, e.id");
    sqlx::query_as::<_, EventoConPunto>(&sql)
        .bind(like_pattern(nombre))
        .fetch_all(pool)
        .await
}

/// Events running on `fecha`. An event without end date lasts one day.
pub async fn find_eventos_en_fecha(
    pool: &PgPool,
    fecha: Date,
) -> Result<Vec<EventoConPunto>, sqlx::Error> {
    let sql = format!(
        "{EVENTO_CON_PUNTO_SELECT}
         WHERE e.fecha_ini <= $1 AND COALESCE(e.fecha_fin, e.fecha_ini) >= $1
         ORDER BY e.fecha_ini, e.id"
    );
    sqlx::query_as::<_, EventoConPunto>(&sql)
        .bind(fecha)
        .fetch_all(pool)
        .await
}

pub async fn insert_evento(pool: &PgPool, evento: &NuevoEvento) -> AppResult<Evento> {
    let mut tx = pool.begin().await?;

    if let Some(punto_id) = evento.punto_id {
        ensure_punto(&mut tx, punto_id).await?;
    }

    let sql = format!(
        "INSERT INTO eventos (nombre, tipo, descripcion, imagen, fecha_ini, fecha_fin, enlace, punto_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {EVENTO_COLUMNS}"
    );
    let inserted = sqlx::query_as::<_, Evento>(&sql)
        .bind(&evento.nombre)
        .bind(&evento.tipo)
        .bind(&evento.descripcion)
        .bind(&evento.imagen)
        .bind(evento.fecha_ini)
        .bind(evento.fecha_fin)
        .bind(&evento.enlace)
        .bind(evento.punto_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(inserted)
}

/// Apply a partial update to an event in one transaction: the stored row is
/// locked, the merged date range checked, and the new point (if any) locked
/// before the update runs. `None` when no event has that id.
pub async fn update_evento(
    pool: &PgPool,
    id: i32,
    update: UpdateBuilder,
    fechas: CambioFechas,
    punto_id: Option<i32>,
) -> AppResult<Option<Evento>> {
    let mut tx = pool.begin().await?;

    // Point deletion locks the point before it touches events
    if let Some(punto_id) = punto_id {
        ensure_punto(&mut tx, punto_id).await?;
    }

    let Some(actual) = lock_evento(&mut tx, id).await? else {
        return Ok(None);
    };
    fechas.check_against(&actual)?;

    let evento = update
        .fetch_optional::<Evento, _>(&mut *tx, id, EVENTO_COLUMNS)
        .await?;

    tx.commit().await?;
    Ok(evento)
}

pub async fn delete_evento(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM eventos WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
