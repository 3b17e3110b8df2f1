//! Error type for catalog operations

use sea_orm::DbErr;
use thiserror::Error;

use crate::singleton::SINGLETON_ERROR_PREFIX;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Could not generate a unique internal SKU with prefix {prefix} after {attempts} attempts")]
    SkuExhausted { prefix: String, attempts: u32 },

    #[error("{0} already exists; only one row is allowed")]
    SingletonExists(&'static str),

    #[error("{field}: {message}")]
    Scope { field: &'static str, message: String },
}

impl CatalogError {
    /// Lift a database error raised by a singleton table's save hook
    pub fn from_singleton(err: DbErr, table: &'static str) -> Self {
        match &err {
            DbErr::Custom(msg) if msg.starts_with(SINGLETON_ERROR_PREFIX) => {
                CatalogError::SingletonExists(table)
            }
            _ => CatalogError::Database(err),
        }
    }
}
