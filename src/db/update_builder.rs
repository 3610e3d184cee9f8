//! Partial-update statement assembly.
//!
//! Only columns named in the builder's allow-list can appear in the `SET`
//! clause, and every value is sent as a bind parameter. Column names are
//! `&'static str` so nothing supplied by a caller can reach the SQL text.

use crate::error::{AppError, Result};
use sqlx::postgres::PgRow;
use sqlx::{Executor, FromRow, Postgres, QueryBuilder};
use time::Date;

/// Name of the Postgres enum type backing point categories.
pub const POINT_CATEGORY_TYPE: &str = "tipo_punto";

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Float(f64),
    Int(i32),
    Date(Date),
    /// A `tipo_punto` label, bound as text and cast to the enum type.
    Category(String),
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value)
    }
}

impl From<Date> for FieldValue {
    fn from(value: Date) -> Self {
        FieldValue::Date(value)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: &'static str,
    allowed: &'static [&'static str],
    assignments: Vec<(&'static str, FieldValue)>,
    rejected: Vec<&'static str>,
}

impl UpdateBuilder {
    pub fn new(table: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            table,
            allowed,
            assignments: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Add `column = value` when a value was supplied. `None` leaves the
    /// column untouched.
    pub fn set<V: Into<FieldValue>>(mut self, column: &'static str, value: Option<V>) -> Self {
        let Some(value) = value else {
            return self;
        };

        if self.allowed.contains(&column) {
            self.assignments.push((column, value.into()));
        } else {
            self.rejected.push(column);
        }
        self
    }

    pub fn set_category(self, column: &'static str, value: Option<String>) -> Self {
        self.set(column, value.map(FieldValue::Category))
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.assignments.iter().map(|(column, _)| *column).collect()
    }

    /// Fail fast, before any database work, when the update cannot be built.
    pub fn check(&self) -> Result<()> {
        if let Some(column) = self.rejected.first() {
            return Err(AppError::Internal(format!(
                "column '{}' is not updatable on {}",
                column, self.table
            )));
        }
        if self.assignments.is_empty() {
            return Err(AppError::InvalidRequest(
                "No se proporcionó ningún campo para actualizar".to_string(),
            ));
        }
        Ok(())
    }

    pub fn build(&self, id: i32, returning: &'static str) -> Result<QueryBuilder<'static, Postgres>> {
        self.check()?;

        let mut query = QueryBuilder::new("UPDATE ");
        query.push(self.table).push(" SET ");

        {
            let mut set = query.separated(", ");
            for (column, value) in &self.assignments {
                set.push(*column);
                set.push_unseparated(" = ");
                match value {
                    FieldValue::Text(v) => {
                        set.push_bind_unseparated(v.clone());
                    }
                    FieldValue::Float(v) => {
                        set.push_bind_unseparated(*v);
                    }
                    FieldValue::Int(v) => {
                        set.push_bind_unseparated(*v);
                    }
                    FieldValue::Date(v) => {
                        set.push_bind_unseparated(*v);
                    }
                    FieldValue::Category(v) => {
                        set.push_bind_unseparated(v.clone());
                        set.push_unseparated("::");
                        set.push_unseparated(POINT_CATEGORY_TYPE);
                    }
                }
            }
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(returning);

        Ok(query)
    }

    /// Run the update against one row. `Ok(None)` means no row has that id.
    pub async fn fetch_optional<'e, T, E>(
        self,
        executor: E,
        id: i32,
        returning: &'static str,
    ) -> Result<Option<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
        E: Executor<'e, Database = Postgres>,
    {
        let mut query = self.build(id, returning)?;

        tracing::debug!(
            table = self.table,
            id,
            columns = ?self.columns(),
            "Applying partial update"
        );

        let row = query.build_query_as::<T>().fetch_optional(executor).await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const ALLOWED: &[&str] = &["nombre", "tipo", "latitud", "longitud", "descripcion"];

    #[test]
    fn test_builds_only_supplied_columns() {
        let builder = UpdateBuilder::new("puntos_interes", ALLOWED)
            .set("nombre", Some("Catedral".to_string()))
            .set::<String>("descripcion", None)
            .set("latitud", Some(0.0));

        assert_eq!(builder.columns(), vec!["nombre", "latitud"]);

        let query = builder.build(7, "id").unwrap();
        assert_eq!(
            query.sql(),
            "UPDATE puntos_interes SET nombre = $1, latitud = $2 WHERE id = $3 RETURNING id"
        );
    }

    #[test]
    fn test_category_is_cast_to_enum() {
        let builder = UpdateBuilder::new("puntos_interes", ALLOWED)
            .set_category("tipo", Some("museo".to_string()));

        let query = builder.build(1, "id").unwrap();
        assert_eq!(
            query.sql(),
            "UPDATE puntos_interes SET tipo = $1::tipo_punto WHERE id = $2 RETURNING id"
        );
    }

    #[test]
    fn test_zero_is_a_supplied_value() {
        let builder = UpdateBuilder::new("puntos_interes", ALLOWED)
            .set("latitud", Some(0.0))
            .set("longitud", Some(0.0));
        assert!(!builder.is_empty());
        assert!(builder.check().is_ok());
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let builder =
            UpdateBuilder::new("puntos_interes", ALLOWED).set::<String>("nombre", None);
        assert!(builder.is_empty());

        let Err(err) = builder.build(1, "id") else {
            panic!("empty update must not build");
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_column_outside_allow_list_is_rejected() {
        let builder = UpdateBuilder::new("usuarios", &["nombre"])
            .set("nombre", Some("Ana".to_string()))
            .set("contrasena", Some("x".to_string()));

        let Err(err) = builder.build(1, "id") else {
            panic!("column outside the allow-list must not build");
        };
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_values_never_reach_sql_text() {
        let builder = UpdateBuilder::new("puntos_interes", ALLOWED)
            .set("nombre", Some("x'; DROP TABLE usuarios; --".to_string()));

        let query = builder.build(1, "id").unwrap();
        assert!(!query.sql().contains("DROP"));
    }
}
