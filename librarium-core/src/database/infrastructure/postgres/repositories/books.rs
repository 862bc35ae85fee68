use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use librarium_model::{
    AuthorId, AuthorSummary, Book, BookDetails, BookId, PublisherId, PublisherSummary,
};

use crate::database::infrastructure::postgres::{internal, translate_db_error};
use crate::database::ports::books::{BookChanges, BookStore, JoinSetChange, NewBook};
use crate::error::{CatalogError, Result};

const BOOK_COLUMNS: &str =
    "pkid, title, isbn, price, edition, printing, image_url, remark, publisher_id";

/// PostgreSQL-backed implementation of the `BookStore` port.
///
/// Book writes that touch join sets run in a transaction: the book row,
/// the authored-by rows, the translated-by rows, and the publisher FK
/// commit together. Join rows cascade when the book row is deleted, the
/// one cascade a book legitimately owns.
#[derive(Debug, Clone)]
pub struct PostgresBookStore {
    pool: PgPool,
}

impl PostgresBookStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn scalar_book(row: &PgRow) -> Book {
    Book {
        pkid: BookId::new(row.get("pkid")),
        title: row.get("title"),
        isbn: row.get("isbn"),
        price: row.get("price"),
        edition: row.get("edition"),
        printing: row.get("printing"),
        image_url: row.get("image_url"),
        remark: row.get("remark"),
        author_ids: Vec::new(),
        translator_ids: Vec::new(),
        publisher_id: PublisherId::new(row.get("publisher_id")),
    }
}

#[async_trait]
impl BookStore for PostgresBookStore {
    async fn create(&self, draft: &NewBook) -> Result<Book> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| internal(e, "failed to start transaction"))?;

        let row = sqlx::query(
            r#"
            INSERT INTO books (title, isbn, price, edition, printing, image_url, remark, publisher_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING pkid
            "#,
        )
        .bind(draft.title.as_str())
        .bind(draft.isbn.as_str())
        .bind(draft.price)
        .bind(draft.edition.as_str())
        .bind(draft.printing.as_str())
        .bind(draft.image_url.as_str())
        .bind(draft.remark.as_deref())
        .bind(draft.publisher_id.as_i64())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| translate_db_error(e, "failed to create book"))?;
        let pkid: i64 = row.get("pkid");

        for author in &draft.author_ids {
            sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES ($1, $2)")
                .bind(pkid)
                .bind(author.as_i64())
                .execute(&mut *tx)
                .await
                .map_err(|e| translate_db_error(e, "failed to attach author"))?;
        }
        for translator in &draft.translator_ids {
            sqlx::query("INSERT INTO book_translators (book_id, translator_id) VALUES ($1, $2)")
                .bind(pkid)
                .bind(translator.as_i64())
                .execute(&mut *tx)
                .await
                .map_err(|e| translate_db_error(e, "failed to attach translator"))?;
        }

        tx.commit()
            .await
            .map_err(|e| internal(e, "failed to commit transaction"))?;

        info!("created book {} (isbn {})", pkid, draft.isbn);
        Ok(Book {
            pkid: BookId::new(pkid),
            title: draft.title.clone(),
            isbn: draft.isbn.clone(),
            price: draft.price,
            edition: draft.edition.clone(),
            printing: draft.printing.clone(),
            image_url: draft.image_url.clone(),
            remark: draft.remark.clone(),
            author_ids: draft.author_ids.clone(),
            translator_ids: draft.translator_ids.clone(),
            publisher_id: draft.publisher_id,
        })
    }

    async fn find_by_pkid(&self, pkid: BookId) -> Result<Option<BookDetails>> {
        let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE pkid = $1"))
            .bind(pkid.as_i64())
            .fetch_optional(self.pool())
            .await
            .map_err(|e| internal(e, "failed to get book by pkid"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut book = scalar_book(&row);

        let authors = sqlx::query(
            r#"
            SELECT a.pkid, a.name
            FROM book_authors j
            JOIN authors a ON a.pkid = j.author_id
            WHERE j.book_id = $1
            ORDER BY a.pkid
            "#,
        )
        .bind(pkid.as_i64())
        .fetch_all(self.pool())
        .await
        .map_err(|e| internal(e, "failed to load book authors"))?
        .into_iter()
        .map(|r| AuthorSummary {
            pkid: AuthorId::new(r.get("pkid")),
            name: r.get("name"),
        })
        .collect::<Vec<_>>();

        let translators = sqlx::query(
            r#"
            SELECT a.pkid, a.name
            FROM book_translators j
            JOIN authors a ON a.pkid = j.translator_id
            WHERE j.book_id = $1
            ORDER BY a.pkid
            "#,
        )
        .bind(pkid.as_i64())
        .fetch_all(self.pool())
        .await
        .map_err(|e| internal(e, "failed to load book translators"))?
        .into_iter()
        .map(|r| AuthorSummary {
            pkid: AuthorId::new(r.get("pkid")),
            name: r.get("name"),
        })
        .collect::<Vec<_>>();

        let publisher = sqlx::query("SELECT pkid, name FROM publishers WHERE pkid = $1")
            .bind(book.publisher_id.as_i64())
            .fetch_one(self.pool())
            .await
            .map_err(|e| internal(e, "failed to load book publisher"))?;
        let publisher = PublisherSummary {
            pkid: PublisherId::new(publisher.get("pkid")),
            name: publisher.get("name"),
        };

        book.author_ids = authors.iter().map(|a| a.pkid).collect();
        book.translator_ids = translators.iter().map(|t| t.pkid).collect();

        Ok(Some(BookDetails {
            book,
            authors,
            translators,
            publisher,
        }))
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = $1"))
            .bind(isbn)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| internal(e, "failed to get book by isbn"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut book = scalar_book(&row);
        let pkid = book.pkid.as_i64();

        book.author_ids =
            sqlx::query("SELECT author_id FROM book_authors WHERE book_id = $1 ORDER BY author_id")
                .bind(pkid)
                .fetch_all(self.pool())
                .await
                .map_err(|e| internal(e, "failed to load book authors"))?
                .into_iter()
                .map(|r| AuthorId::new(r.get("author_id")))
                .collect();
        book.translator_ids = sqlx::query(
            "SELECT translator_id FROM book_translators WHERE book_id = $1 ORDER BY translator_id",
        )
        .bind(pkid)
        .fetch_all(self.pool())
        .await
        .map_err(|e| internal(e, "failed to load book translators"))?
        .into_iter()
        .map(|r| AuthorId::new(r.get("translator_id")))
        .collect();

        Ok(Some(book))
    }

    async fn list(&self) -> Result<Vec<BookDetails>> {
        let book_rows = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY pkid"))
            .fetch_all(self.pool())
            .await
            .map_err(|e| internal(e, "failed to list books"))?;

        // One grouped query per relation instead of per-book round trips.
        let mut authors_by_book: HashMap<i64, Vec<AuthorSummary>> = HashMap::new();
        let rows = sqlx::query(
            r#"
            SELECT j.book_id, a.pkid, a.name
            FROM book_authors j
            JOIN authors a ON a.pkid = j.author_id
            ORDER BY j.book_id, a.pkid
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| internal(e, "failed to list book authors"))?;
        for row in rows {
            authors_by_book
                .entry(row.get("book_id"))
                .or_default()
                .push(AuthorSummary {
                    pkid: AuthorId::new(row.get("pkid")),
                    name: row.get("name"),
                });
        }

        let mut translators_by_book: HashMap<i64, Vec<AuthorSummary>> = HashMap::new();
        let rows = sqlx::query(
            r#"
            SELECT j.book_id, a.pkid, a.name
            FROM book_translators j
            JOIN authors a ON a.pkid = j.translator_id
            ORDER BY j.book_id, a.pkid
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| internal(e, "failed to list book translators"))?;
        for row in rows {
            translators_by_book
                .entry(row.get("book_id"))
                .or_default()
                .push(AuthorSummary {
                    pkid: AuthorId::new(row.get("pkid")),
                    name: row.get("name"),
                });
        }

        let mut publishers: HashMap<i64, String> = HashMap::new();
        let rows = sqlx::query("SELECT pkid, name FROM publishers")
            .fetch_all(self.pool())
            .await
            .map_err(|e| internal(e, "failed to list publishers"))?;
        for row in rows {
            publishers.insert(row.get("pkid"), row.get("name"));
        }

        let mut details = Vec::with_capacity(book_rows.len());
        for row in &book_rows {
            let mut book = scalar_book(row);
            let pkid = book.pkid.as_i64();
            let authors = authors_by_book.remove(&pkid).unwrap_or_default();
            let translators = translators_by_book.remove(&pkid).unwrap_or_default();
            let publisher_name = publishers
                .get(&book.publisher_id.as_i64())
                .cloned()
                .ok_or_else(|| {
                    CatalogError::Internal(format!(
                        "book {pkid} references missing publisher {}",
                        book.publisher_id
                    ))
                })?;
            book.author_ids = authors.iter().map(|a| a.pkid).collect();
            book.translator_ids = translators.iter().map(|t| t.pkid).collect();
            details.push(BookDetails {
                publisher: PublisherSummary {
                    pkid: book.publisher_id,
                    name: publisher_name,
                },
                book,
                authors,
                translators,
            });
        }
        Ok(details)
    }

    async fn update(&self, pkid: BookId, changes: &BookChanges) -> Result<Book> {
        let key = pkid.as_i64();
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| internal(e, "failed to start transaction"))?;

        let existing = sqlx::query("SELECT pkid FROM books WHERE pkid = $1 FOR UPDATE")
            .bind(key)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| internal(e, "failed to lock book row"))?;
        if existing.is_none() {
            return Err(CatalogError::not_found("Book", pkid));
        }

        if changes.has_scalar_changes() {
            let mut sets: Vec<String> = Vec::new();
            if changes.title.is_some() {
                sets.push(format!("title = ${}", sets.len() + 1));
            }
            if changes.isbn.is_some() {
                sets.push(format!("isbn = ${}", sets.len() + 1));
            }
            if changes.price.is_some() {
                sets.push(format!("price = ${}", sets.len() + 1));
            }
            if changes.edition.is_some() {
                sets.push(format!("edition = ${}", sets.len() + 1));
            }
            if changes.printing.is_some() {
                sets.push(format!("printing = ${}", sets.len() + 1));
            }
            if changes.image_url.is_some() {
                sets.push(format!("image_url = ${}", sets.len() + 1));
            }
            if changes.remark.is_some() {
                sets.push(format!("remark = ${}", sets.len() + 1));
            }
            if changes.publisher_id.is_some() {
                sets.push(format!("publisher_id = ${}", sets.len() + 1));
            }
            let sql = format!(
                "UPDATE books SET {} WHERE pkid = ${}",
                sets.join(", "),
                sets.len() + 1
            );

            let mut query = sqlx::query(&sql);
            if let Some(title) = &changes.title {
                query = query.bind(title.as_str());
            }
            if let Some(isbn) = &changes.isbn {
                query = query.bind(isbn.as_str());
            }
            if let Some(price) = changes.price {
                query = query.bind(price);
            }
            if let Some(edition) = &changes.edition {
                query = query.bind(edition.as_str());
            }
            if let Some(printing) = &changes.printing {
                query = query.bind(printing.as_str());
            }
            if let Some(image_url) = &changes.image_url {
                query = query.bind(image_url.as_str());
            }
            if let Some(remark) = &changes.remark {
                query = query.bind(remark.as_str());
            }
            if let Some(publisher_id) = changes.publisher_id {
                query = query.bind(publisher_id.as_i64());
            }
            query
                .bind(key)
                .execute(&mut *tx)
                .await
                .map_err(|e| translate_db_error(e, "failed to update book"))?;
        }

        // Full replace: drop the whole join set, then recreate it.
        if !changes.authors.is_keep() {
            sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
                .bind(key)
                .execute(&mut *tx)
                .await
                .map_err(|e| internal(e, "failed to clear book authors"))?;
            if let JoinSetChange::Replace(ids) = &changes.authors {
                for id in ids {
                    sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES ($1, $2)")
                        .bind(key)
                        .bind(id.as_i64())
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| translate_db_error(e, "failed to attach author"))?;
                }
            }
        }
        if !changes.translators.is_keep() {
            sqlx::query("DELETE FROM book_translators WHERE book_id = $1")
                .bind(key)
                .execute(&mut *tx)
                .await
                .map_err(|e| internal(e, "failed to clear book translators"))?;
            if let JoinSetChange::Replace(ids) = &changes.translators {
                for id in ids {
                    sqlx::query(
                        "INSERT INTO book_translators (book_id, translator_id) VALUES ($1, $2)",
                    )
                    .bind(key)
                    .bind(id.as_i64())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| translate_db_error(e, "failed to attach translator"))?;
                }
            }
        }

        let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE pkid = $1"))
            .bind(key)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| internal(e, "failed to reload book"))?;
        let mut book = scalar_book(&row);
        book.author_ids =
            sqlx::query("SELECT author_id FROM book_authors WHERE book_id = $1 ORDER BY author_id")
                .bind(key)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| internal(e, "failed to reload book authors"))?
                .into_iter()
                .map(|r| AuthorId::new(r.get("author_id")))
                .collect();
        book.translator_ids = sqlx::query(
            "SELECT translator_id FROM book_translators WHERE book_id = $1 ORDER BY translator_id",
        )
        .bind(key)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| internal(e, "failed to reload book translators"))?
        .into_iter()
        .map(|r| AuthorId::new(r.get("translator_id")))
        .collect();

        tx.commit()
            .await
            .map_err(|e| internal(e, "failed to commit transaction"))?;

        info!("updated book {}", pkid);
        Ok(book)
    }

    async fn delete(&self, pkid: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE pkid = $1")
            .bind(pkid.as_i64())
            .execute(self.pool())
            .await
            .map_err(|e| internal(e, "failed to delete book"))?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }
        info!("deleted book {}", pkid);
        Ok(true)
    }

    async fn count_by_author(&self, author: AuthorId) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM book_authors WHERE author_id = $1")
            .bind(author.as_i64())
            .fetch_one(self.pool())
            .await
            .map_err(|e| internal(e, "failed to count books by author"))?;
        Ok(row.get("count"))
    }

    async fn count_by_translator(&self, translator: AuthorId) -> Result<i64> {
        let row =
            sqlx::query("SELECT COUNT(*) AS count FROM book_translators WHERE translator_id = $1")
                .bind(translator.as_i64())
                .fetch_one(self.pool())
                .await
                .map_err(|e| internal(e, "failed to count books by translator"))?;
        Ok(row.get("count"))
    }

    async fn count_by_publisher(&self, publisher: PublisherId) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM books WHERE publisher_id = $1")
            .bind(publisher.as_i64())
            .fetch_one(self.pool())
            .await
            .map_err(|e| internal(e, "failed to count books by publisher"))?;
        Ok(row.get("count"))
    }
}
