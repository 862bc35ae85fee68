use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use librarium_model::{Publisher, PublisherId};

use crate::database::infrastructure::postgres::{internal, translate_db_error};
use crate::database::ports::publishers::{NewPublisher, PublisherChanges, PublisherStore};
use crate::error::{CatalogError, Result};

/// PostgreSQL-backed implementation of the `PublisherStore` port.
#[derive(Debug, Clone)]
pub struct PostgresPublisherStore {
    pool: PgPool,
}

impl PostgresPublisherStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn publisher_from_row(row: &PgRow) -> Publisher {
    Publisher {
        pkid: PublisherId::new(row.get("pkid")),
        name: row.get("name"),
    }
}

#[async_trait]
impl PublisherStore for PostgresPublisherStore {
    async fn create(&self, draft: &NewPublisher) -> Result<Publisher> {
        let row = sqlx::query("INSERT INTO publishers (name) VALUES ($1) RETURNING pkid, name")
            .bind(draft.name.as_str())
            .fetch_one(self.pool())
            .await
            .map_err(|e| translate_db_error(e, "failed to create publisher"))?;

        let publisher = publisher_from_row(&row);
        info!("created publisher {} ({})", publisher.name, publisher.pkid);
        Ok(publisher)
    }

    async fn find_by_pkid(&self, pkid: PublisherId) -> Result<Option<Publisher>> {
        let row = sqlx::query("SELECT pkid, name FROM publishers WHERE pkid = $1")
            .bind(pkid.as_i64())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| internal(e, "failed to get publisher by pkid"))?;
        Ok(row.map(|r| publisher_from_row(&r)))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Publisher>> {
        let row = sqlx::query("SELECT pkid, name FROM publishers WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| internal(e, "failed to get publisher by name"))?;
        Ok(row.map(|r| publisher_from_row(&r)))
    }

    async fn list(&self) -> Result<Vec<Publisher>> {
        let rows = sqlx::query("SELECT pkid, name FROM publishers ORDER BY pkid")
            .fetch_all(self.pool())
            .await
            .map_err(|e| internal(e, "failed to list publishers"))?;
        Ok(rows.iter().map(publisher_from_row).collect())
    }

    async fn update(&self, pkid: PublisherId, changes: &PublisherChanges) -> Result<Publisher> {
        let Some(name) = &changes.name else {
            return self
                .find_by_pkid(pkid)
                .await?
                .ok_or_else(|| CatalogError::not_found("Publisher", pkid));
        };

        let row = sqlx::query("UPDATE publishers SET name = $1 WHERE pkid = $2 RETURNING pkid, name")
            .bind(name.as_str())
            .bind(pkid.as_i64())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| translate_db_error(e, "failed to update publisher"))?
            .ok_or_else(|| CatalogError::not_found("Publisher", pkid))?;

        info!("updated publisher {}", pkid);
        Ok(publisher_from_row(&row))
    }

    async fn delete(&self, pkid: PublisherId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM publishers WHERE pkid = $1")
            .bind(pkid.as_i64())
            .execute(self.pool())
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.constraint() == Some("books_publisher_id_fkey") {
                        return CatalogError::Conflict(format!(
                            "publisher {pkid} is still referenced by books"
                        ));
                    }
                }
                internal(e, "failed to delete publisher")
            })?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }
        info!("deleted publisher {}", pkid);
        Ok(true)
    }
}
