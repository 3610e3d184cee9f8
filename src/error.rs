use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Closed set of failure classes the API distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Unauthorized,
    Internal,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing required fields: {0:?}")]
    MissingFields(Vec<&'static str>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Database(e) if is_unique_violation(e) => ErrorKind::Conflict,
            AppError::Database(e) if is_foreign_key_violation(e) => ErrorKind::NotFound,
            AppError::Database(_) | AppError::PasswordHash(_) | AppError::Internal(_) => {
                ErrorKind::Internal
            }
            AppError::InvalidRequest(_) | AppError::MissingFields(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

/// A write referenced a row that is gone, e.g. a point deleted concurrently.
fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_foreign_key_violation(),
        _ => false,
    }
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();

        let body = match self {
            AppError::Database(ref e) if kind == ErrorKind::Conflict => {
                tracing::warn!("Unique constraint violation: {}", e);
                json!({ "error": "El registro ya existe" })
            }
            AppError::Database(ref e) if kind == ErrorKind::NotFound => {
                tracing::warn!("Foreign key violation: {}", e);
                json!({ "error": "El registro referenciado no existe" })
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                json!({ "error": "Error en la base de datos" })
            }
            AppError::PasswordHash(ref e) => {
                tracing::error!("Password hashing error: {}", e);
                json!({ "error": "Error interno del servidor" })
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                json!({ "error": "Error interno del servidor" })
            }
            AppError::MissingFields(ref fields) => json!({
                "error": "Faltan campos obligatorios",
                "detalles": fields,
            }),
            AppError::InvalidRequest(ref e)
            | AppError::NotFound(ref e)
            | AppError::Conflict(ref e)
            | AppError::Unauthorized(ref e) => json!({ "error": e }),
        };

        (kind.status_code(), Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_kind_status_codes() {
        assert_eq!(ErrorKind::Validation.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorKind::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ErrorKind::Internal.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_variant_kinds() {
        assert_eq!(
            AppError::InvalidRequest("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            AppError::MissingFields(vec!["nombre"]).kind(),
            ErrorKind::Validation
        );
        assert_eq!(AppError::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(AppError::Conflict("x".into()).kind(), ErrorKind::Conflict);
        assert_eq!(
            AppError::Unauthorized("x".into()).kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).kind(),
            ErrorKind::Internal
        );
    }

    #[tokio::test]
    async fn test_missing_fields_body_lists_fields() {
        let response = AppError::MissingFields(vec!["nombre", "tipo"]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Faltan campos obligatorios");
        assert_eq!(json["detalles"], serde_json::json!(["nombre", "tipo"]));
    }

    #[tokio::test]
    async fn test_internal_errors_do_not_leak_details() {
        let response = AppError::Database(sqlx::Error::Protocol(
            "relation \"secret_table\" does not exist".into(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Error en la base de datos");
        assert!(!json.to_string().contains("secret_table"));
        assert!(json.get("detalles").is_none());
    }
}
