use crate::db::update_builder::UpdateBuilder;
use crate::error::{AppError, Result};
use crate::models::fields::{non_blank, non_blank_update, required};
use crate::models::Punto;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;
use time::OffsetDateTime;

pub const RUTA_COLUMNS: &str = "id, nombre, descripcion, fecha_creacion, duracion";

pub const RUTA_UPDATABLE: &[&str] = &["nombre", "descripcion"];

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ruta {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub fecha_creacion: OffsetDateTime,
    /// Estimated traversal time in minutes, derived from the route's points
    pub duracion: i32,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PuntoEnRuta {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub punto: Punto,
    pub orden: Option<i32>,
}

/// A route together with its points, as returned by `GET /rutas/{id}`
#[derive(Debug, Clone, Serialize)]
pub struct RutaDetalle {
    #[serde(flatten)]
    pub ruta: Ruta,
    pub puntos: Vec<PuntoEnRuta>,
}

/// Body of `POST /rutas`
#[derive(Debug, Default, Deserialize)]
pub struct CrearRuta {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    /// Point ids, in visiting order
    #[serde(default)]
    pub puntos: Option<Vec<i32>>,
}

#[derive(Debug, Clone)]
pub struct NuevaRuta {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub puntos: Vec<i32>,
}

impl CrearRuta {
    pub fn validate(self) -> Result<NuevaRuta> {
        let mut missing = Vec::new();
        let Some(nombre) = required(&mut missing, "nombre", non_blank(self.nombre)) else {
            return Err(AppError::MissingFields(missing));
        };

        let puntos = self.puntos.unwrap_or_default();
        let mut seen = HashSet::with_capacity(puntos.len());
        if let Some(repetido) = puntos.iter().find(|id| !seen.insert(**id)) {
            return Err(AppError::InvalidRequest(format!(
                "El punto {} aparece más de una vez en la ruta",
                repetido
            )));
        }

        Ok(NuevaRuta {
            nombre,
            descripcion: non_blank(self.descripcion),
            puntos,
        })
    }
}

/// Body of `PATCH /rutas/{id}`
#[derive(Debug, Default, Deserialize)]
pub struct ActualizarRuta {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
}

impl ActualizarRuta {
    pub fn validate(self) -> Result<Self> {
        Ok(Self {
            nombre: non_blank_update("nombre", self.nombre)?,
            descripcion: self.descripcion,
        })
    }

    pub fn into_update(self) -> UpdateBuilder {
        UpdateBuilder::new("rutas", RUTA_UPDATABLE)
            .set("nombre", self.nombre)
            .set("descripcion", self.descripcion)
    }
}

/// Body of `POST /rutas/{id}/puntos`
#[derive(Debug, Deserialize)]
pub struct AnadirPunto {
    pub punto_id: Option<i32>,
    pub orden: Option<i32>,
}

impl AnadirPunto {
    /// Returns `(punto_id, orden)`.
    pub fn validate(&self) -> Result<(i32, Option<i32>)> {
        let punto_id = self
            .punto_id
            .ok_or_else(|| AppError::MissingFields(vec!["punto_id"]))?;

        if matches!(self.orden, Some(orden) if orden < 0) {
            return Err(AppError::InvalidRequest(
                "orden no puede ser negativo".to_string(),
            ));
        }
        Ok((punto_id, self.orden))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crear_ruta_valid() {
        let nueva = CrearRuta {
            nombre: Some("Ruta mudéjar".to_string()),
            descripcion: Some("  ".to_string()),
            puntos: Some(vec![3, 1, 2]),
        }
        .validate()
        .unwrap();

        assert_eq!(nueva.nombre, "Ruta mudéjar");
        assert!(nueva.descripcion.is_none());
        assert_eq!(nueva.puntos, vec![3, 1, 2]);
    }

    #[test]
    fn test_crear_ruta_without_points() {
        let nueva = CrearRuta {
            nombre: Some("Vacía".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert!(nueva.puntos.is_empty());
    }

    #[test]
    fn test_crear_ruta_rejects_duplicate_points() {
        let result = CrearRuta {
            nombre: Some("Repetida".to_string()),
            descripcion: None,
            puntos: Some(vec![1, 2, 1]),
        }
        .validate();
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn test_crear_ruta_requires_name() {
        let result = CrearRuta::default().validate();
        assert!(matches!(result, Err(AppError::MissingFields(f)) if f == vec!["nombre"]));
    }

    #[test]
    fn test_anadir_punto_validation() {
        let body = AnadirPunto {
            punto_id: None,
            orden: None,
        };
        assert!(body.validate().is_err());

        let body = AnadirPunto {
            punto_id: Some(4),
            orden: Some(-1),
        };
        assert!(body.validate().is_err());

        let body = AnadirPunto {
            punto_id: Some(4),
            orden: Some(2),
        };
        assert_eq!(body.validate().unwrap(), (4, Some(2)));
    }

    #[test]
    fn test_actualizar_ruta_columns() {
        let update = ActualizarRuta {
            nombre: None,
            descripcion: Some("Nueva descripción".to_string()),
        }
        .validate()
        .unwrap()
        .into_update();
        assert_eq!(update.columns(), vec!["descripcion"]);
    }
}
