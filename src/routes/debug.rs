use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

const COUNTED_TABLES: &[(&str, &str)] = &[
    ("puntos", "SELECT COUNT(*) FROM puntos_interes"),
    ("usuarios", "SELECT COUNT(*) FROM usuarios"),
    ("eventos", "SELECT COUNT(*) FROM eventos"),
    ("rutas", "SELECT COUNT(*) FROM rutas"),
];

/// GET /debug/health - Check the database and report row counts
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut status = json!({
        "status": "ok",
        "checks": {},
        "counts": {}
    });

    // Check database
    match sqlx::query("SELECT 1").fetch_one(&state.db_pool).await {
        Ok(_) => {
            status["checks"]["database"] = json!("ok");
        }
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            status["checks"]["database"] = json!({"error": "unreachable"});
            status["status"] = json!("error");
            return Json(status);
        }
    }

    for (name, sql) in COUNTED_TABLES {
        match sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&state.db_pool)
            .await
        {
            Ok(count) => {
                status["counts"][*name] = json!(count);
            }
            Err(e) => {
                tracing::error!("Health check count of {} failed: {}", name, e);
                status["counts"][*name] = json!({"error": "unavailable"});
            }
        }
    }

    Json(status)
}
