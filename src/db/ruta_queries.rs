use crate::error::{AppError, Result as AppResult};
use crate::models::ruta::{NuevaRuta, RUTA_COLUMNS};
use crate::models::{Coordinates, PuntoEnRuta, Ruta, RutaDetalle};
use crate::services::duration;
use sqlx::{Executor, PgConnection, PgPool, Postgres};

use super::{like_pattern, punto_queries};

pub async fn list_rutas(pool: &PgPool) -> Result<Vec<Ruta>, sqlx::Error> {
    let sql = format!("SELECT {RUTA_COLUMNS} FROM rutas ORDER BY id");
    sqlx::query_as::<_, Ruta>(&sql).fetch_all(pool).await
}

pub async fn find_ruta_by_id<'e, E>(
    executor: E,
    id: i32,
) -> Result<Option<Ruta>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!("SELECT {RUTA_COLUMNS} FROM rutas WHERE id = $1");
    sqlx::query_as::<_, Ruta>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Same as [`find_ruta_by_id`] but takes a row lock, so concurrent edits of
/// one route's points apply their duration adjustments one after another.
async fn lock_ruta(conn: &mut PgConnection, id: i32) -> Result<Option<Ruta>, sqlx::Error> {
    let sql = format!("SELECT {RUTA_COLUMNS} FROM rutas WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, Ruta>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await
}

/// Lock several routes in id order. Callers already hold the point lock, so
/// the order is always point, then routes.
pub(crate) async fn lock_rutas(conn: &mut PgConnection, ids: &[i32]) -> Result<(), sqlx::Error> {
    if ids.is_empty() {
        return Ok(());
    }
    sqlx::query("SELECT id FROM rutas WHERE id = ANY($1) ORDER BY id FOR UPDATE")
        .bind(ids)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn find_rutas_by_nombre(
    pool: &PgPool,
    nombre: &str,
) -> Result<Vec<Ruta>, sqlx::Error> {
    let sql = format!("SELECT {RUTA_COLUMNS} FROM rutas WHERE nombre ILIKE $1 ORDER BY nombre, id");
    sqlx::query_as::<_, Ruta>(&sql)
        .bind(like_pattern(nombre))
        .fetch_all(pool)
        .await
}

/// Points of a route, explicit order first
pub async fn puntos_de_ruta<'e, E>(
    executor: E,
    ruta_id: i32,
) -> Result<Vec<PuntoEnRuta>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, PuntoEnRuta>(
        r#"
        SELECT
            p.id,
            p.nombre,
            p.tipo::text AS tipo,
            p.latitud,
            p.longitud,
            p.descripcion,
            p.imagen,
            rp.orden
        FROM rutas_puntos rp
        JOIN puntos_interes p ON p.id = rp.punto_id
        WHERE rp.ruta_id = $1
        ORDER BY rp.orden NULLS LAST, p.id
        "#,
    )
    .bind(ruta_id)
    .fetch_all(executor)
    .await
}

pub async fn find_ruta_detalle(pool: &PgPool, id: i32) -> Result<Option<RutaDetalle>, sqlx::Error> {
    let Some(ruta) = find_ruta_by_id(pool, id).await? else {
        return Ok(None);
    };
    let puntos = puntos_de_ruta(pool, id).await?;
    Ok(Some(RutaDetalle { ruta, puntos }))
}

/// Whether another route already uses `nombre`.
pub async fn nombre_ruta_en_uso<'e, E>(
    executor: E,
    nombre: &str,
    excluir: Option<i32>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM rutas WHERE nombre = $1 AND id IS DISTINCT FROM $2)",
    )
    .bind(nombre)
    .bind(excluir)
    .fetch_one(executor)
    .await
}

async fn coordinates_of(
    conn: &mut PgConnection,
    ruta_id: i32,
) -> Result<Vec<Coordinates>, sqlx::Error> {
    let rows: Vec<(f64, f64)> = sqlx::query_as(
        r#"
        SELECT p.latitud, p.longitud
        FROM rutas_puntos rp
        JOIN puntos_interes p ON p.id = rp.punto_id
        WHERE rp.ruta_id = $1
        "#,
    )
    .bind(ruta_id)
    .fetch_all(conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(lat, lng)| Coordinates { lat, lng })
        .collect())
}

async fn set_duration(
    conn: &mut PgConnection,
    ruta_id: i32,
    minutes: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE rutas SET duracion = $1 WHERE id = $2")
        .bind(minutes)
        .bind(ruta_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Full nearest-neighbour recomputation of a route's stored duration.
pub async fn recompute_duration(
    conn: &mut PgConnection,
    ruta_id: i32,
) -> Result<i32, sqlx::Error> {
    let points = coordinates_of(&mut *conn, ruta_id).await?;
    let minutes = duration::route_duration_minutes(&points);
    set_duration(&mut *conn, ruta_id, minutes).await?;

    tracing::debug!(ruta_id, points = points.len(), minutes, "Route duration recomputed");
    Ok(minutes)
}

/// Create a route with its initial points in one transaction.
pub async fn create_ruta(pool: &PgPool, nueva: &NuevaRuta) -> AppResult<RutaDetalle> {
    let mut tx = pool.begin().await?;

    if nombre_ruta_en_uso(&mut *tx, &nueva.nombre, None).await? {
        return Err(AppError::Conflict(format!(
            "Ya existe una ruta con el nombre '{}'",
            nueva.nombre
        )));
    }

    let encontrados: Vec<i32> =
        sqlx::query_scalar("SELECT id FROM puntos_interes WHERE id = ANY($1) FOR KEY SHARE")
            .bind(&nueva.puntos)
            .fetch_all(&mut *tx)
            .await?;
    let faltan: Vec<i32> = nueva
        .puntos
        .iter()
        .filter(|id| !encontrados.contains(id))
        .copied()
        .collect();
    if !faltan.is_empty() {
        return Err(AppError::NotFound(format!(
            "Puntos de interés no encontrados: {:?}",
            faltan
        )));
    }

    let sql = format!(
        "INSERT INTO rutas (nombre, descripcion) VALUES ($1, $2) RETURNING {RUTA_COLUMNS}"
    );
    let ruta = sqlx::query_as::<_, Ruta>(&sql)
        .bind(&nueva.nombre)
        .bind(&nueva.descripcion)
        .fetch_one(&mut *tx)
        .await?;

    // Position in the request becomes the visiting order, starting at 1
    sqlx::query(
        r#"
        INSERT INTO rutas_puntos (ruta_id, punto_id, orden)
        SELECT $1, t.punto_id, t.orden::int
        FROM UNNEST($2::int[]) WITH ORDINALITY AS t(punto_id, orden)
        "#,
    )
    .bind(ruta.id)
    .bind(&nueva.puntos)
    .execute(&mut *tx)
    .await?;

    let duracion = recompute_duration(&mut tx, ruta.id).await?;
    let puntos = puntos_de_ruta(&mut *tx, ruta.id).await?;

    tx.commit().await?;

    Ok(RutaDetalle {
        ruta: Ruta { duracion, ..ruta },
        puntos,
    })
}

/// Attach a point to a route and add its contribution to the duration.
pub async fn add_punto(
    pool: &PgPool,
    ruta_id: i32,
    punto_id: i32,
    orden: Option<i32>,
) -> AppResult<RutaDetalle> {
    let mut tx = pool.begin().await?;

    // Point before route, the same order a point deletion takes them in
    let punto = punto_queries::lock_punto(&mut tx, punto_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Punto de interés {} no encontrado", punto_id)))?;

    let ruta = lock_ruta(&mut tx, ruta_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ruta {} no encontrada", ruta_id)))?;

    let ya_incluido: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM rutas_puntos WHERE ruta_id = $1 AND punto_id = $2)",
    )
    .bind(ruta_id)
    .bind(punto_id)
    .fetch_one(&mut *tx)
    .await?;
    if ya_incluido {
        return Err(AppError::Conflict(format!(
            "El punto {} ya forma parte de la ruta {}",
            punto_id, ruta_id
        )));
    }

    let existentes = coordinates_of(&mut tx, ruta_id).await?;
    let duracion = duration::duration_after_insert(ruta.duracion, &punto.coordinates(), &existentes);

    sqlx::query(
        r#"
        INSERT INTO rutas_puntos (ruta_id, punto_id, orden)
        VALUES (
            $1,
            $2,
            COALESCE($3, (SELECT COALESCE(MAX(orden), 0) + 1 FROM rutas_puntos WHERE ruta_id = $1))
        )
        "#,
    )
    .bind(ruta_id)
    .bind(punto_id)
    .bind(orden)
    .execute(&mut *tx)
    .await?;

    set_duration(&mut tx, ruta_id, duracion).await?;
    let puntos = puntos_de_ruta(&mut *tx, ruta_id).await?;

    tx.commit().await?;

    Ok(RutaDetalle {
        ruta: Ruta { duracion, ..ruta },
        puntos,
    })
}

/// Detach a point from a route and subtract its contribution, floored at zero.
pub async fn remove_punto(pool: &PgPool, ruta_id: i32, punto_id: i32) -> AppResult<RutaDetalle> {
    let mut tx = pool.begin().await?;

    let ruta = lock_ruta(&mut tx, ruta_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ruta {} no encontrada", ruta_id)))?;

    let quitado: Option<(f64, f64)> = sqlx::query_as(
        r#"
        DELETE FROM rutas_puntos rp
        USING puntos_interes p
        WHERE rp.ruta_id = $1 AND rp.punto_id = $2 AND p.id = rp.punto_id
        RETURNING p.latitud, p.longitud
        "#,
    )
    .bind(ruta_id)
    .bind(punto_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((lat, lng)) = quitado else {
        return Err(AppError::NotFound(format!(
            "El punto {} no forma parte de la ruta {}",
            punto_id, ruta_id
        )));
    };

    let restantes = coordinates_of(&mut tx, ruta_id).await?;
    let duracion =
        duration::duration_after_removal(ruta.duracion, &Coordinates { lat, lng }, &restantes);

    set_duration(&mut tx, ruta_id, duracion).await?;
    let puntos = puntos_de_ruta(&mut *tx, ruta_id).await?;

    tx.commit().await?;

    Ok(RutaDetalle {
        ruta: Ruta { duracion, ..ruta },
        puntos,
    })
}

/// Explicit full recomputation. `None` when the route does not exist.
pub async fn recompute_ruta(pool: &PgPool, ruta_id: i32) -> AppResult<Option<RutaDetalle>> {
    let mut tx = pool.begin().await?;

    let Some(ruta) = lock_ruta(&mut tx, ruta_id).await? else {
        return Ok(None);
    };

    let duracion = recompute_duration(&mut tx, ruta_id).await?;
    let puntos = puntos_de_ruta(&mut *tx, ruta_id).await?;

    tx.commit().await?;

    Ok(Some(RutaDetalle {
        ruta: Ruta { duracion, ..ruta },
        puntos,
    }))
}

/// Delete a route and its point associations. `false` when it did not exist.
pub async fn delete_ruta(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM rutas_puntos WHERE ruta_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let borradas = sqlx::query("DELETE FROM rutas WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok(borradas > 0)
}
