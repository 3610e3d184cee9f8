use crate::constants::{MAX_CATEGORY_LABEL_LENGTH, MAX_ENUM_LABEL_BYTES};
use crate::error::{AppError, Result};
use serde::Deserialize;
use std::fmt;

/// A label for the `tipo_punto` enum that is safe to embed in DDL.
///
/// `ALTER TYPE ... ADD VALUE` takes no bind parameters, so the label is
/// written into the statement text. Construction through [`CategoryLabel::parse`]
/// restricts it to lowercase letters, digits, `_` and single spaces, which
/// excludes quotes and every other character with meaning inside a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLabel(String);

impl CategoryLabel {
    pub fn parse(raw: &str) -> Result<Self> {
        let label = raw.trim().to_lowercase();

        if label.is_empty() {
            return Err(AppError::MissingFields(vec!["nombre"]));
        }
        if label.chars().count() > MAX_CATEGORY_LABEL_LENGTH || label.len() > MAX_ENUM_LABEL_BYTES {
            return Err(AppError::InvalidRequest(format!(
                "El nombre de la categoría no puede superar {} caracteres ni {} bytes",
                MAX_CATEGORY_LABEL_LENGTH, MAX_ENUM_LABEL_BYTES
            )));
        }

        let allowed = label.chars().all(|c| {
            (c.is_alphabetic() && c.is_lowercase()) || c.is_ascii_digit() || c == '_' || c == ' '
        });
        if !allowed || label.contains("  ") {
            return Err(AppError::InvalidRequest(format!(
                "Nombre de categoría no válido: '{}' (solo letras minúsculas, dígitos, '_' y espacios)",
                raw.trim()
            )));
        }

        Ok(CategoryLabel(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Body of `POST /categorias`
#[derive(Debug, Deserialize)]
pub struct CrearCategoria {
    pub nombre: Option<String>,
}

impl CrearCategoria {
    pub fn validate(&self) -> Result<CategoryLabel> {
        CategoryLabel::parse(self.nombre.as_deref().unwrap_or_default())
    }
}
