use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use librarium_model::{Author, AuthorId};

use crate::database::infrastructure::postgres::internal;
use crate::database::ports::authors::{AuthorChanges, AuthorStore, NewAuthor};
use crate::error::{CatalogError, Result};

const AUTHOR_COLUMNS: &str = "pkid, name, country, birth_date, death_date, introduction";

/// PostgreSQL-backed implementation of the `AuthorStore` port.
#[derive(Debug, Clone)]
pub struct PostgresAuthorStore {
    pool: PgPool,
}

impl PostgresAuthorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn author_from_row(row: &PgRow) -> Author {
    Author {
        pkid: AuthorId::new(row.get("pkid")),
        name: row.get("name"),
        country: row.get("country"),
        birth_date: row.get::<Option<NaiveDate>, _>("birth_date"),
        death_date: row.get::<Option<NaiveDate>, _>("death_date"),
        introduction: row.get("introduction"),
    }
}

#[async_trait]
impl AuthorStore for PostgresAuthorStore {
    async fn create(&self, draft: &NewAuthor) -> Result<Author> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO authors (name, country, birth_date, death_date, introduction)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {AUTHOR_COLUMNS}
            "#
        ))
        .bind(draft.name.as_str())
        .bind(draft.country.as_deref())
        .bind(draft.birth_date)
        .bind(draft.death_date)
        .bind(draft.introduction.as_deref())
        .fetch_one(self.pool())
        .await
        .map_err(|e| internal(e, "failed to create author"))?;

        let author = author_from_row(&row);
        info!("created author {} ({})", author.name, author.pkid);
        Ok(author)
    }

    async fn find_by_pkid(&self, pkid: AuthorId) -> Result<Option<Author>> {
        let row = sqlx::query(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE pkid = $1"
        ))
        .bind(pkid.as_i64())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| internal(e, "failed to get author by pkid"))?;
        Ok(row.map(|r| author_from_row(&r)))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Author>> {
        // Author names are not unique; first match in key order.
        let row = sqlx::query(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors WHERE name = $1 ORDER BY pkid LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| internal(e, "failed to get author by name"))?;
        Ok(row.map(|r| author_from_row(&r)))
    }

    async fn list(&self) -> Result<Vec<Author>> {
        let rows = sqlx::query(&format!("SELECT {AUTHOR_COLUMNS} FROM authors ORDER BY pkid"))
            .fetch_all(self.pool())
            .await
            .map_err(|e| internal(e, "failed to list authors"))?;
        Ok(rows.iter().map(author_from_row).collect())
    }

    async fn update(&self, pkid: AuthorId, changes: &AuthorChanges) -> Result<Author> {
        let mut sets: Vec<String> = Vec::new();
        if changes.name.is_some() {
            sets.push(format!("name = ${}", sets.len() + 1));
        }
        if changes.country.is_some() {
            sets.push(format!("country = ${}", sets.len() + 1));
        }
        if changes.birth_date.is_some() {
            sets.push(format!("birth_date = ${}", sets.len() + 1));
        }
        if changes.death_date.is_some() {
            sets.push(format!("death_date = ${}", sets.len() + 1));
        }
        if changes.introduction.is_some() {
            sets.push(format!("introduction = ${}", sets.len() + 1));
        }
        if sets.is_empty() {
            return self
                .find_by_pkid(pkid)
                .await?
                .ok_or_else(|| CatalogError::not_found("Author", pkid));
        }
        let sql = format!(
            "UPDATE authors SET {} WHERE pkid = ${} RETURNING {AUTHOR_COLUMNS}",
            sets.join(", "),
            sets.len() + 1
        );

        let mut query = sqlx::query(&sql);
        if let Some(name) = &changes.name {
            query = query.bind(name.as_str());
        }
        if let Some(country) = &changes.country {
            query = query.bind(country.as_str());
        }
        if let Some(birth_date) = changes.birth_date {
            query = query.bind(birth_date);
        }
        if let Some(death_date) = changes.death_date {
            query = query.bind(death_date);
        }
        if let Some(introduction) = &changes.introduction {
            query = query.bind(introduction.as_str());
        }
        let row = query
            .bind(pkid.as_i64())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| internal(e, "failed to update author"))?
            .ok_or_else(|| CatalogError::not_found("Author", pkid))?;

        info!("updated author {}", pkid);
        Ok(author_from_row(&row))
    }

    async fn delete(&self, pkid: AuthorId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE pkid = $1")
            .bind(pkid.as_i64())
            .execute(self.pool())
            .await
            .map_err(|e| {
                // FK restriction backstop: the directory guard should have
                // fired before a referenced author reaches this delete.
                if let sqlx::Error::Database(db) = &e {
                    if matches!(
                        db.constraint(),
                        Some("book_authors_author_id_fkey")
                            | Some("book_translators_translator_id_fkey")
                    ) {
                        return CatalogError::Conflict(format!(
                            "author {pkid} is still referenced by book relations"
                        ));
                    }
                }
                internal(e, "failed to delete author")
            })?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }
        info!("deleted author {}", pkid);
        Ok(true)
    }
}
