use crate::constants::MIN_PASSWORD_LENGTH;
use crate::db::update_builder::UpdateBuilder;
use crate::error::{AppError, Result};
use crate::models::fields::{non_blank, non_blank_update, required, validate_email};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Public projection of a user, without the password column.
pub const USUARIO_COLUMNS: &str = "id, nombre_usuario, nombre, apellido, email, telefono";

pub const USUARIO_UPDATABLE: &[&str] = &["nombre_usuario", "nombre", "apellido", "email", "telefono"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Usuario {
    pub id: i32,
    pub nombre_usuario: String,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub telefono: Option<String>,
}

/// Stored bcrypt hash for a user, only read by login and password change.
#[derive(FromRow)]
pub struct Credenciales {
    pub id: i32,
    pub contrasena: String,
}

// Keep the hash out of logs
impl std::fmt::Debug for Credenciales {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credenciales")
            .field("id", &self.id)
            .field("contrasena", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /usuarios`
#[derive(Debug, Default, Deserialize)]
pub struct CrearUsuario {
    pub nombre_usuario: Option<String>,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "contraseña")]
    pub contrasena: Option<String>,
    pub telefono: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NuevoUsuario {
    pub nombre_usuario: String,
    pub nombre: String,
    pub apellido: String,
    pub email: String,
    pub contrasena: String,
    pub telefono: Option<String>,
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::InvalidRequest(format!(
            "La contraseña debe tener al menos {} caracteres",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

impl CrearUsuario {
    pub fn validate(self) -> Result<NuevoUsuario> {
        let mut missing = Vec::new();
        let nombre_usuario = required(&mut missing, "nombre_usuario", non_blank(self.nombre_usuario));
        let nombre = required(&mut missing, "nombre", non_blank(self.nombre));
        let apellido = required(&mut missing, "apellido", non_blank(self.apellido));
        let email = required(&mut missing, "email", non_blank(self.email));
        // Passwords are not trimmed
        let contrasena = required(
            &mut missing,
            "contrasena",
            self.contrasena.filter(|p| !p.is_empty()),
        );

        let (Some(nombre_usuario), Some(nombre), Some(apellido), Some(email), Some(contrasena)) =
            (nombre_usuario, nombre, apellido, email, contrasena)
        else {
            return Err(AppError::MissingFields(missing));
        };

        let email = email.to_lowercase();
        validate_email(&email)?;
        validate_password(&contrasena)?;

        Ok(NuevoUsuario {
            nombre_usuario,
            nombre,
            apellido,
            email,
            contrasena,
            telefono: non_blank(self.telefono),
        })
    }
}

/// Body of `PATCH /usuarios/{id}`
#[derive(Debug, Default, Deserialize)]
pub struct ActualizarUsuario {
    pub nombre_usuario: Option<String>,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
}

impl ActualizarUsuario {
    pub fn validate(self) -> Result<Self> {
        let email = non_blank_update("email", self.email)?.map(|e| e.to_lowercase());
        if let Some(ref email) = email {
            validate_email(email)?;
        }

        Ok(Self {
            nombre_usuario: non_blank_update("nombre_usuario", self.nombre_usuario)?,
            nombre: non_blank_update("nombre", self.nombre)?,
            apellido: non_blank_update("apellido", self.apellido)?,
            email,
            telefono: self.telefono.map(|t| t.trim().to_string()),
        })
    }

    pub fn into_update(self) -> UpdateBuilder {
        UpdateBuilder::new("usuarios", USUARIO_UPDATABLE)
            .set("nombre_usuario", self.nombre_usuario)
            .set("nombre", self.nombre)
            .set("apellido", self.apellido)
            .set("email", self.email)
            .set("telefono", self.telefono)
    }
}

/// Body of `PUT /usuarios/{id}/contrasena`
#[derive(Debug, Deserialize)]
pub struct CambiarContrasena {
    pub contrasena_actual: Option<String>,
    pub contrasena_nueva: Option<String>,
}

impl CambiarContrasena {
    /// Returns `(current, new)`.
    pub fn validate(self) -> Result<(String, String)> {
        let mut missing = Vec::new();
        let actual = required(
            &mut missing,
            "contrasena_actual",
            self.contrasena_actual.filter(|p| !p.is_empty()),
        );
        let nueva = required(
            &mut missing,
            "contrasena_nueva",
            self.contrasena_nueva.filter(|p| !p.is_empty()),
        );

        let (Some(actual), Some(nueva)) = (actual, nueva) else {
            return Err(AppError::MissingFields(missing));
        };

        validate_password(&nueva)?;
        Ok((actual, nueva))
    }
}

/// Body of `POST /usuarios/login`
#[derive(Debug, Deserialize)]
pub struct Login {
    pub email: Option<String>,
    #[serde(alias = "contraseña")]
    pub contrasena: Option<String>,
}

impl Login {
    /// Returns `(email, password)`.
    pub fn validate(self) -> Result<(String, String)> {
        let mut missing = Vec::new();
        let email = required(&mut missing, "email", non_blank(self.email));
        let contrasena = required(
            &mut missing,
            "contrasena",
            self.contrasena.filter(|p| !p.is_empty()),
        );

        match (email, contrasena) {
            (Some(email), Some(contrasena)) => Ok((email.to_lowercase(), contrasena)),
            _ => Err(AppError::MissingFields(missing)),
        }
    }
}
