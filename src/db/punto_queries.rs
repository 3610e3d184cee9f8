use crate::db::update_builder::UpdateBuilder;
use crate::error::Result as AppResult;
use crate::models::punto::{NuevoPunto, PUNTO_COLUMNS};
use crate::models::Punto;
use sqlx::{Executor, PgConnection, PgPool, Postgres};

use super::{like_pattern, ruta_queries};

pub async fn list_puntos(pool: &PgPool) -> Result<Vec<Punto>, sqlx::Error> {
    let sql = format!("SELECT {PUNTO_COLUMNS} FROM puntos_interes ORDER BY id");
    sqlx::query_as::<_, Punto>(&sql).fetch_all(pool).await
}

pub async fn find_punto_by_id<'e, E>(executor: E, id: i32) -> Result<Option<Punto>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!("SELECT {PUNTO_COLUMNS} FROM puntos_interes WHERE id = $1");
    sqlx::query_as::<_, Punto>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Read a point and hold a key-share lock on it until the transaction ends.
/// Rows referencing the point can then be written without racing its deletion.
pub async fn lock_punto(conn: &mut PgConnection, id: i32) -> Result<Option<Punto>, sqlx::Error> {
    let sql = format!("SELECT {PUNTO_COLUMNS} FROM puntos_interes WHERE id = $1 FOR KEY SHARE");
    sqlx::query_as::<_, Punto>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Points whose category is any of `tipos`. Unknown labels simply match nothing.
pub async fn find_puntos_by_tipos(pool: &PgPool, tipos: &[String]) -> Result<Vec<Punto>, sqlx::Error> {
    let sql = format!(
        "SELECT {PUNTO_COLUMNS} FROM puntos_interes WHERE tipo::text = ANY($1) ORDER BY id"
    );
    sqlx::query_as::<_, Punto>(&sql)
        .bind(tipos)
        .fetch_all(pool)
        .await
}

/// Case-insensitive substring match on the point name
pub async fn find_puntos_by_nombre(pool: &PgPool, nombre: &str) -> Result<Vec<Punto>, sqlx::Error> {
    let sql = format!(
        "SELECT {PUNTO_COLUMNS} FROM puntos_interes WHERE nombre ILIKE $1 ORDER BY nombre, id"
    );
    sqlx::query_as::<_, Punto>(&sql)
        .bind(like_pattern(nombre))
        .fetch_all(pool)
        .await
}

pub async fn insert_punto(pool: &PgPool, punto: &NuevoPunto) -> Result<Punto, sqlx::Error> {
    let sql = format!(
        "INSERT INTO puntos_interes (nombre, tipo, latitud, longitud, descripcion, imagen)
         VALUES ($1, $2::tipo_punto, $3, $4, $5, $6)
         RETURNING {PUNTO_COLUMNS}"
    );
    sqlx::query_as::<_, Punto>(&sql)
        .bind(&punto.nombre)
        .bind(&punto.tipo)
        .bind(punto.coordinates.lat)
        .bind(punto.coordinates.lng)
        .bind(&punto.descripcion)
        .bind(&punto.imagen)
        .fetch_one(pool)
        .await
}

/// Apply a partial update to a point. When the point moves, the durations of
/// the routes that visit it are recomputed in the same transaction.
///
/// Returns the updated point and the ids of the recomputed routes, or `None`
/// when no point has that id.
pub async fn update_punto(
    pool: &PgPool,
    id: i32,
    update: UpdateBuilder,
) -> AppResult<Option<(Punto, Vec<i32>)>> {
    let moves = update
        .columns()
        .iter()
        .any(|c| matches!(*c, "latitud" | "longitud"));

    let mut tx = pool.begin().await?;

    let Some(punto) = update
        .fetch_optional::<Punto, _>(&mut *tx, id, PUNTO_COLUMNS)
        .await?
    else {
        return Ok(None);
    };

    let mut rutas = Vec::new();
    if moves {
        rutas = sqlx::query_scalar("SELECT ruta_id FROM rutas_puntos WHERE punto_id = $1")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        ruta_queries::lock_rutas(&mut tx, &rutas).await?;
        for ruta_id in &rutas {
            ruta_queries::recompute_duration(&mut tx, *ruta_id).await?;
        }
    }

    tx.commit().await?;
    Ok(Some((punto, rutas)))
}

/// What deleting a point touched besides the point row itself
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PuntoBorrado {
    pub eventos_desvinculados: u64,
    pub rutas_afectadas: Vec<i32>,
}

/// Delete a point and everything that references it, in one transaction.
///
/// Order: lock the point, detach events, drop route associations, lock and
/// recompute every affected route, then delete the point row. Returns `None` without
/// changing anything when the point does not exist.
pub async fn delete_punto(pool: &PgPool, id: i32) -> Result<Option<PuntoBorrado>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    // Conflicts with the key-share lock writers of associations hold
    let exists: Option<i32> =
        sqlx::query_scalar("SELECT id FROM puntos_interes WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    if exists.is_none() {
        return Ok(None);
    }

    let eventos = sqlx::query("UPDATE eventos SET punto_id = NULL WHERE punto_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let rutas_afectadas: Vec<i32> = sqlx::query_scalar(
        "DELETE FROM rutas_puntos WHERE punto_id = $1 RETURNING ruta_id",
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;

    ruta_queries::lock_rutas(&mut tx, &rutas_afectadas).await?;
    for ruta_id in &rutas_afectadas {
        ruta_queries::recompute_duration(&mut *tx, *ruta_id).await?;
    }

    sqlx::query("DELETE FROM puntos_interes WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Some(PuntoBorrado {
        eventos_desvinculados: eventos,
        rutas_afectadas,
    }))
}
