use crate::db::update_builder::UpdateBuilder;
use crate::error::{AppError, Result};
use crate::models::coordinates::{self, Coordinates};
use crate::models::fields::{non_blank, non_blank_update, required};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Projection used by every query returning a `Punto`.
pub const PUNTO_COLUMNS: &str =
    "id, nombre, tipo::text AS tipo, latitud, longitud, descripcion, imagen";

pub const PUNTO_UPDATABLE: &[&str] = &[
    "nombre",
    "tipo",
    "latitud",
    "longitud",
    "descripcion",
    "imagen",
];

/// A point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Punto {
    pub id: i32,
    pub nombre: String,
    /// Label of the `tipo_punto` enum
    pub tipo: String,
    pub latitud: f64,
    pub longitud: f64,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
}

impl Punto {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.latitud,
            lng: self.longitud,
        }
    }
}

/// Body of `POST /puntos`
#[derive(Debug, Default, Deserialize)]
pub struct CrearPunto {
    pub nombre: Option<String>,
    pub tipo: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NuevoPunto {
    pub nombre: String,
    pub tipo: String,
    pub coordinates: Coordinates,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
}

impl CrearPunto {
    pub fn validate(self) -> Result<NuevoPunto> {
        let mut missing = Vec::new();
        let nombre = required(&mut missing, "nombre", non_blank(self.nombre));
        let tipo = required(&mut missing, "tipo", non_blank(self.tipo));
        let latitud = required(&mut missing, "latitud", self.latitud);
        let longitud = required(&mut missing, "longitud", self.longitud);

        let (Some(nombre), Some(tipo), Some(latitud), Some(longitud)) =
            (nombre, tipo, latitud, longitud)
        else {
            return Err(AppError::MissingFields(missing));
        };

        let coordinates = Coordinates::new(latitud, longitud).map_err(AppError::InvalidRequest)?;

        Ok(NuevoPunto {
            nombre,
            tipo: tipo.to_lowercase(),
            coordinates,
            descripcion: non_blank(self.descripcion),
            imagen: non_blank(self.imagen),
        })
    }
}

/// Body of `PATCH /puntos/{id}`
#[derive(Debug, Default, Deserialize)]
pub struct ActualizarPunto {
    pub nombre: Option<String>,
    pub tipo: Option<String>,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
}

impl ActualizarPunto {
    pub fn validate(self) -> Result<Self> {
        coordinates::validate_partial(self.latitud, self.longitud)
            .map_err(AppError::InvalidRequest)?;

        Ok(Self {
            nombre: non_blank_update("nombre", self.nombre)?,
            tipo: non_blank_update("tipo", self.tipo)?.map(|t| t.to_lowercase()),
            ..self
        })
    }

    pub fn into_update(self) -> UpdateBuilder {
        UpdateBuilder::new("puntos_interes", PUNTO_UPDATABLE)
            .set("nombre", self.nombre)
            .set_category("tipo", self.tipo)
            .set("latitud", self.latitud)
            .set("longitud", self.longitud)
            .set("descripcion", self.descripcion)
            .set("imagen", self.imagen)
    }
}

/// Query string of `GET /puntos/tipos?tipos=a,b`
#[derive(Debug, Deserialize)]
pub struct TiposQuery {
    #[serde(default)]
    pub tipos: Option<String>,
}

impl TiposQuery {
    /// Parse categories from comma-separated string
    pub fn parse(&self) -> Result<Vec<String>> {
        let tipos: Vec<String> = self
            .tipos
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        if tipos.is_empty() {
            return Err(AppError::MissingFields(vec!["tipos"]));
        }
        Ok(tipos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn crear(nombre: &str, tipo: &str, lat: f64, lng: f64) -> CrearPunto {
        CrearPunto {
            nombre: Some(nombre.to_string()),
            tipo: Some(tipo.to_string()),
            latitud: Some(lat),
            longitud: Some(lng),
            ..Default::default()
        }
    }

    #[test]
    fn test_crear_punto_valid() {
        let nuevo = crear(" Pilar ", "Iglesia", 41.6568, -0.8786).validate().unwrap();
        assert_eq!(nuevo.nombre, "Pilar");
        assert_eq!(nuevo.tipo, "iglesia");
        assert_eq!(nuevo.coordinates.lat, 41.6568);
        assert!(nuevo.descripcion.is_none());
    }

    #[test]
    fn test_crear_punto_missing_fields() {
        let err = CrearPunto {
            nombre: Some("  ".to_string()),
            latitud: Some(0.0),
            ..Default::default()
        }
        .validate()
        .unwrap_err();

        match err {
            AppError::MissingFields(fields) => {
                assert_eq!(fields, vec!["nombre", "tipo", "longitud"])
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_crear_punto_accepts_zero_coordinates() {
        assert!(crear("Null Island", "otro", 0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_crear_punto_rejects_out_of_range() {
        let err = crear("X", "otro", 95.0, 0.0).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_actualizar_punto_builds_present_fields_only() {
        let update = ActualizarPunto {
            latitud: Some(0.0),
            tipo: Some("MUSEO".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap()
        .into_update();

        assert_eq!(update.columns(), vec!["tipo", "latitud"]);
    }

    #[test]
    fn test_actualizar_punto_empty() {
        let update = ActualizarPunto::default().validate().unwrap().into_update();
        assert!(update.is_empty());
        assert_eq!(update.check().unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_actualizar_punto_rejects_blank_name() {
        let result = ActualizarPunto {
            nombre: Some(String::new()),
            ..Default::default()
        }
        .validate();
        assert!(result.is_err());
    }

    #[test]
    fn test_tipos_query_parse() {
        let query = TiposQuery {
            tipos: Some("museo, Parque,,".to_string()),
        };
        assert_eq!(query.parse().unwrap(), vec!["museo", "parque"]);

        let query = TiposQuery { tipos: None };
        assert!(query.parse().is_err());
    }
}
