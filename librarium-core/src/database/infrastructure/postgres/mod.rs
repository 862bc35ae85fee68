//! PostgreSQL adapter for the entity-store ports.
//!
//! Queries are bound at runtime; multi-row writes (a book plus its join
//! sets) run inside a transaction. Constraint violations are translated
//! into the crate error taxonomy by constraint name, so the unique and
//! foreign-key constraints double as a backstop behind the services'
//! proactive checks.

pub mod repositories;

pub use repositories::{
    PostgresAuthorStore, PostgresBookStore, PostgresPublisherStore, PostgresUserStore,
};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::error::{CatalogError, Result};

/// Owns the connection pool and hands it to the per-entity repositories.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        info!("connecting to PostgreSQL");
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| {
                CatalogError::Internal(format!("failed to connect to PostgreSQL: {e}"))
            })?;
        info!("connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        info!("running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| CatalogError::Internal(format!("failed to run migrations: {e}")))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a database error onto the taxonomy by constraint name; anything
/// unrecognized stays an `Internal` carrying the caller's context.
pub(crate) fn translate_db_error(err: sqlx::Error, context: &str) -> CatalogError {
    if let sqlx::Error::Database(db) = &err {
        match db.constraint() {
            Some("books_isbn_key") => {
                return CatalogError::Conflict("isbn already exists".to_string());
            }
            Some("publishers_name_key") => {
                return CatalogError::Conflict("publisher name already exists".to_string());
            }
            Some("book_authors_author_id_fkey") | Some("book_translators_translator_id_fkey") => {
                return CatalogError::Validation("referenced author does not exist".to_string());
            }
            Some("books_publisher_id_fkey") => {
                return CatalogError::Validation("referenced publisher does not exist".to_string());
            }
            Some("book_authors_pkey") | Some("book_translators_pkey") => {
                return CatalogError::Validation("duplicate entry in relation set".to_string());
            }
            _ => {}
        }
    }
    CatalogError::Internal(format!("{context}: {err}"))
}

pub(crate) fn internal(err: sqlx::Error, context: &str) -> CatalogError {
    CatalogError::Internal(format!("{context}: {err}"))
}
