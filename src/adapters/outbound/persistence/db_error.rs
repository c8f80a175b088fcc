use crate::domain::errors::CatalogError;

/// Map a sqlx error onto the catalog error taxonomy.
///
/// Unique violations (23505) become `Conflict` and foreign key violations
/// (23503) become `Validation`; everything else is internal.
pub(crate) fn map_db_error(error: sqlx::Error, entity: &str) -> CatalogError {
    if let Some(db_error) = error.as_database_error() {
        if db_error.is_unique_violation() {
            return CatalogError::conflict(format!("{} already exists", entity));
        }
        if db_error.is_foreign_key_violation() {
            return CatalogError::validation("Referenced record does not exist");
        }
    }

    tracing::error!(error = %error, entity, "Database error");
    CatalogError::internal(format!("Database error: {}", error))
}
