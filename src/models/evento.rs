use crate::db::update_builder::UpdateBuilder;
use crate::error::{AppError, Result};
use crate::models::fields::{non_blank, non_blank_update, required};
use crate::models::Punto;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::macros::format_description;
use time::Date;

pub const EVENTO_COLUMNS: &str =
    "id, nombre, tipo, descripcion, imagen, fecha_ini, fecha_fin, enlace, punto_id";

pub const EVENTO_UPDATABLE: &[&str] = &[
    "nombre",
    "tipo",
    "descripcion",
    "imagen",
    "fecha_ini",
    "fecha_fin",
    "enlace",
    "punto_id",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Evento {
    pub id: i32,
    pub nombre: String,
    pub tipo: String,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
    pub fecha_ini: Date,
    pub fecha_fin: Option<Date>,
    pub enlace: Option<String>,
    pub punto_id: Option<i32>,
}

/// Event with its point of interest embedded, `punto` is `null` when the
/// event is not tied to a mapped point.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventoConPunto {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub evento: Evento,
    pub punto: Option<Json<Punto>>,
}

/// Parse a `YYYY-MM-DD` path segment.
pub fn parse_fecha(raw: &str) -> Result<Date> {
    Date::parse(raw, format_description!("[year]-[month]-[day]")).map_err(|_| {
        AppError::InvalidRequest(format!(
            "Fecha no válida: '{}' (formato esperado AAAA-MM-DD)",
            raw
        ))
    })
}

fn check_fechas(fecha_ini: Date, fecha_fin: Option<Date>) -> Result<()> {
    match fecha_fin {
        Some(fin) if fin < fecha_ini => Err(AppError::InvalidRequest(
            "fecha_fin no puede ser anterior a fecha_ini".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Body of `POST /eventos`
#[derive(Debug, Default, Deserialize)]
pub struct CrearEvento {
    pub nombre: Option<String>,
    pub tipo: Option<String>,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
    pub fecha_ini: Option<Date>,
    pub fecha_fin: Option<Date>,
    pub enlace: Option<String>,
    pub punto_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NuevoEvento {
    pub nombre: String,
    pub tipo: String,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
    pub fecha_ini: Date,
    pub fecha_fin: Option<Date>,
    pub enlace: Option<String>,
    pub punto_id: Option<i32>,
}

impl CrearEvento {
    pub fn validate(self) -> Result<NuevoEvento> {
        let mut missing = Vec::new();
        let nombre = required(&mut missing, "nombre", non_blank(self.nombre));
        let tipo = required(&mut missing, "tipo", non_blank(self.tipo));
        let fecha_ini = required(&mut missing, "fecha_ini", self.fecha_ini);

        let (Some(nombre), Some(tipo), Some(fecha_ini)) = (nombre, tipo, fecha_ini) else {
            return Err(AppError::MissingFields(missing));
        };

        check_fechas(fecha_ini, self.fecha_fin)?;

        Ok(NuevoEvento {
            nombre,
            tipo,
            descripcion: non_blank(self.descripcion),
            imagen: non_blank(self.imagen),
            fecha_ini,
            fecha_fin: self.fecha_fin,
            enlace: non_blank(self.enlace),
            punto_id: self.punto_id,
        })
    }
}

/// Dates carried by a partial update. They can only be checked against the
/// stored row, so the check runs where that row is locked.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CambioFechas {
    pub fecha_ini: Option<Date>,
    pub fecha_fin: Option<Date>,
}

impl CambioFechas {
    /// Check the date range that results from applying the change to `actual`.
    pub fn check_against(&self, actual: &Evento) -> Result<()> {
        check_fechas(
            self.fecha_ini.unwrap_or(actual.fecha_ini),
            self.fecha_fin.or(actual.fecha_fin),
        )
    }
}

/// Body of `PATCH /eventos/{id}`
#[derive(Debug, Default, Deserialize)]
pub struct ActualizarEvento {
    pub nombre: Option<String>,
    pub tipo: Option<String>,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
    pub fecha_ini: Option<Date>,
    pub fecha_fin: Option<Date>,
    pub enlace: Option<String>,
    pub punto_id: Option<i32>,
}

impl ActualizarEvento {
    pub fn validate(self) -> Result<Self> {
        Ok(Self {
            nombre: non_blank_update("nombre", self.nombre)?,
            tipo: non_blank_update("tipo", self.tipo)?,
            ..self
        })
    }

    pub fn fechas(&self) -> CambioFechas {
        CambioFechas {
            fecha_ini: self.fecha_ini,
            fecha_fin: self.fecha_fin,
        }
    }

    pub fn into_update(self) -> UpdateBuilder {
        UpdateBuilder::new("eventos", EVENTO_UPDATABLE)
            .set("nombre", self.nombre)
            .set("tipo", self.tipo)
            .set("descripcion", self.descripcion)
            .set("imagen", self.imagen)
            .set("fecha_ini", self.fecha_ini)
            .set("fecha_fin", self.fecha_fin)
            .set("enlace", self.enlace)
            .set("punto_id", self.punto_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn evento(fecha_ini: Date, fecha_fin: Option<Date>) -> Evento {
        Evento {
            id: 1,
            nombre: "Fiestas del Pilar".to_string(),
            tipo: "fiesta".to_string(),
            descripcion: None,
            imagen: None,
            fecha_ini,
            fecha_fin,
            enlace: None,
            punto_id: None,
        }
    }

    #[test]
    fn test_parse_fecha() {
        assert_eq!(parse_fecha("2024-10-12").unwrap(), date!(2024 - 10 - 12));
        assert!(parse_fecha("12/10/2024").is_err());
        assert!(parse_fecha("2024-02-30").is_err());
    }

    #[test]
    fn test_crear_evento_from_json() {
        let body: CrearEvento = serde_json::from_value(serde_json::json!({
            "nombre": "Concierto",
            "tipo": "musica",
            "fecha_ini": "2024-06-21",
            "punto_id": 3
        }))
        .unwrap();

        let nuevo = body.validate().unwrap();
        assert_eq!(nuevo.fecha_ini, date!(2024 - 6 - 21));
        assert_eq!(nuevo.fecha_fin, None);
        assert_eq!(nuevo.punto_id, Some(3));
    }

    #[test]
    fn test_crear_evento_missing_fields() {
        let err = CrearEvento {
            nombre: Some("Concierto".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, AppError::MissingFields(f) if f == vec!["tipo", "fecha_ini"]));
    }

    #[test]
    fn test_crear_evento_rejects_inverted_dates() {
        let result = CrearEvento {
            nombre: Some("Feria".to_string()),
            tipo: Some("feria".to_string()),
            fecha_ini: Some(date!(2024 - 5 - 10)),
            fecha_fin: Some(date!(2024 - 5 - 1)),
            ..Default::default()
        }
        .validate();
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn test_actualizar_evento_checks_merged_dates() {
        let actual = evento(date!(2024 - 10 - 5), Some(date!(2024 - 10 - 13)));

        let update = ActualizarEvento {
            fecha_ini: Some(date!(2024 - 10 - 20)),
            ..Default::default()
        };
        assert!(update.fechas().check_against(&actual).is_err());

        let update = ActualizarEvento {
            fecha_fin: Some(date!(2024 - 10 - 20)),
            ..Default::default()
        };
        assert!(update.fechas().check_against(&actual).is_ok());

        // No dates in the body keeps the stored range
        assert_eq!(ActualizarEvento::default().fechas(), CambioFechas::default());
        assert!(CambioFechas::default().check_against(&actual).is_ok());
    }

    #[test]
    fn test_empty_actualizar_evento_is_rejected_before_any_lookup() {
        let update = ActualizarEvento::default().validate().unwrap().into_update();
        assert!(update.is_empty());
        let err = update.check().err().unwrap();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[test]
    fn test_evento_serializes_dates_as_iso() {
        let json = serde_json::to_value(evento(date!(2024 - 10 - 5), None)).unwrap();
        assert_eq!(json["fecha_ini"], "2024-10-05");
        assert!(json["fecha_fin"].is_null());
    }
}
