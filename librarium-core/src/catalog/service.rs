//! The catalog engine: book persistence orchestration.
//!
//! Owns the consistency rules around a book's relation sets: create and
//! update go through the store as one transaction, relation updates are
//! full-replace, and the reference-count queries used by the directory
//! delete guards live here. Concurrent full-replace updates of the same
//! book are not serialized by this layer; the last recreate wins.

use std::sync::Arc;

use librarium_model::{AuthorId, Book, BookDetails, BookId, PublisherId};
use tracing::info;

use crate::database::ports::books::{BookChanges, BookStore, JoinSetChange, NewBook};
use crate::error::{CatalogError, Result};

/// Input for [`CatalogService::create`]. Relation lists carry
/// already-resolved keys; run the request through the relation resolver
/// first when it arrived with names.
#[derive(Debug, Clone)]
pub struct CreateBookCommand {
    pub title: String,
    pub isbn: String,
    pub price: f64,
    pub edition: String,
    pub printing: String,
    pub image_url: String,
    pub remark: Option<String>,

    pub author_ids: Vec<AuthorId>,
    pub translator_ids: Vec<AuthorId>,
    pub publisher_id: PublisherId,
}

/// Input for [`CatalogService::update`]. Absent fields leave the stored
/// value untouched; present relation lists replace the whole join set.
/// `translator_ids: Some(vec![])` clears all translators.
#[derive(Debug, Clone, Default)]
pub struct UpdateBookCommand {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub price: Option<f64>,
    pub edition: Option<String>,
    pub printing: Option<String>,
    pub image_url: Option<String>,
    pub remark: Option<String>,

    pub author_ids: Option<Vec<AuthorId>>,
    pub translator_ids: Option<Vec<AuthorId>>,
    pub publisher_id: Option<PublisherId>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl UpdateBookCommand {
    /// Drops fields that are present but semantically empty: blank
    /// strings, non-positive price or publisher key, and an empty author
    /// list (authors are mandatory, so an empty list can never be meant
    /// as a replacement). An empty translator list is the one exception:
    /// it is an explicit request to clear the set.
    fn sanitize(self) -> BookChanges {
        let authors = match self.author_ids {
            Some(ids) if !ids.is_empty() => JoinSetChange::Replace(ids),
            _ => JoinSetChange::Keep,
        };
        let translators = match self.translator_ids {
            Some(ids) if ids.is_empty() => JoinSetChange::Clear,
            Some(ids) => JoinSetChange::Replace(ids),
            None => JoinSetChange::Keep,
        };
        BookChanges {
            title: non_blank(self.title),
            isbn: non_blank(self.isbn),
            price: self.price.filter(|p| *p > 0.0),
            edition: non_blank(self.edition),
            printing: non_blank(self.printing),
            image_url: non_blank(self.image_url),
            remark: non_blank(self.remark),
            authors,
            translators,
            publisher_id: self.publisher_id.filter(|id| id.is_valid()),
        }
    }
}

/// The catalog engine, generic over the book store backend.
#[derive(Clone)]
pub struct CatalogService {
    books: Arc<dyn BookStore>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService").finish_non_exhaustive()
    }
}

impl CatalogService {
    pub fn new(books: Arc<dyn BookStore>) -> Self {
        Self { books }
    }

    /// Persists a book and its relation sets. The store write is
    /// transactional; the ISBN pre-check here classifies the common
    /// conflict before it, with the unique constraint as backstop.
    pub async fn create(&self, command: CreateBookCommand) -> Result<Book> {
        if command.title.trim().is_empty() {
            return Err(CatalogError::Validation(
                "title must not be blank".to_string(),
            ));
        }
        if command.isbn.trim().is_empty() {
            return Err(CatalogError::Validation(
                "isbn must not be blank".to_string(),
            ));
        }
        if command.price < 0.0 {
            return Err(CatalogError::Validation(
                "price must not be negative".to_string(),
            ));
        }
        if command.author_ids.is_empty() {
            return Err(CatalogError::Validation(
                "a book requires at least one author".to_string(),
            ));
        }
        if !command.publisher_id.is_valid() {
            return Err(CatalogError::Validation(
                "a book requires a publisher".to_string(),
            ));
        }

        if self.books.find_by_isbn(&command.isbn).await?.is_some() {
            return Err(CatalogError::already_exists("Book", command.isbn));
        }

        let draft = NewBook {
            title: command.title,
            isbn: command.isbn,
            price: command.price,
            edition: command.edition,
            printing: command.printing,
            image_url: command.image_url,
            remark: command.remark,
            author_ids: command.author_ids,
            translator_ids: command.translator_ids,
            publisher_id: command.publisher_id,
        };
        let book = self.books.create(&draft).await?;
        info!(
            "catalogued book {} with {} author(s), {} translator(s)",
            book.pkid,
            book.author_ids.len(),
            book.translator_ids.len()
        );
        Ok(book)
    }

    pub async fn find_by_pkid(&self, pkid: BookId) -> Result<Option<BookDetails>> {
        self.books.find_by_pkid(pkid).await
    }

    pub async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        self.books.find_by_isbn(isbn).await
    }

    pub async fn list(&self) -> Result<Vec<BookDetails>> {
        self.books.list().await
    }

    /// Applies a partial update. Present relation lists replace the whole
    /// join set (never a merge); sanitized-away fields are dropped
    /// silently, but an update with nothing left is an error.
    pub async fn update(&self, pkid: BookId, command: UpdateBookCommand) -> Result<Book> {
        let changes = command.sanitize();
        if changes.is_empty() {
            return Err(CatalogError::Validation(
                "update contains no effective changes".to_string(),
            ));
        }

        if let Some(isbn) = &changes.isbn {
            if let Some(existing) = self.books.find_by_isbn(isbn).await? {
                if existing.pkid != pkid {
                    return Err(CatalogError::already_exists("Book", isbn.clone()));
                }
            }
        }

        self.books.update(pkid, &changes).await
    }

    pub async fn delete(&self, pkid: BookId) -> Result<()> {
        if !self.books.delete(pkid).await? {
            return Err(CatalogError::not_found("Book", pkid));
        }
        Ok(())
    }

    /// Books referencing the author in the authored-by role.
    pub async fn count_by_author(&self, author: AuthorId) -> Result<i64> {
        self.books.count_by_author(author).await
    }

    /// Books referencing the author in the translated-by role.
    pub async fn count_by_translator(&self, translator: AuthorId) -> Result<i64> {
        self.books.count_by_translator(translator).await
    }

    /// Books referencing the publisher.
    pub async fn count_by_publisher(&self, publisher: PublisherId) -> Result<i64> {
        self.books.count_by_publisher(publisher).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update_with_scalars() -> UpdateBookCommand {
        UpdateBookCommand {
            title: Some("  ".to_string()),
            isbn: Some("".to_string()),
            price: Some(-1.0),
            edition: Some("2nd".to_string()),
            printing: None,
            image_url: Some(" ".to_string()),
            remark: Some("".to_string()),
            author_ids: Some(vec![]),
            translator_ids: None,
            publisher_id: Some(PublisherId::new(0)),
        }
    }

    #[test]
    fn sanitize_drops_blank_and_non_positive_fields() {
        let changes = update_with_scalars().sanitize();
        assert!(changes.title.is_none());
        assert!(changes.isbn.is_none());
        assert!(changes.price.is_none());
        assert_eq!(changes.edition.as_deref(), Some("2nd"));
        assert!(changes.image_url.is_none());
        assert!(changes.remark.is_none());
        assert!(changes.publisher_id.is_none());
        // Empty author list is dropped, not treated as a replacement.
        assert_eq!(changes.authors, JoinSetChange::Keep);
    }

    #[test]
    fn sanitize_keeps_zero_price_out_but_allows_positive() {
        let changes = UpdateBookCommand {
            price: Some(0.0),
            ..Default::default()
        }
        .sanitize();
        assert!(changes.price.is_none());

        let changes = UpdateBookCommand {
            price: Some(12.5),
            ..Default::default()
        }
        .sanitize();
        assert_eq!(changes.price, Some(12.5));
    }

    #[test]
    fn empty_translator_list_means_clear() {
        let changes = UpdateBookCommand {
            translator_ids: Some(vec![]),
            ..Default::default()
        }
        .sanitize();
        assert_eq!(changes.translators, JoinSetChange::Clear);
        assert!(!changes.is_empty());
    }

    #[test]
    fn fully_sanitized_update_is_empty() {
        let command = UpdateBookCommand {
            title: Some(" ".to_string()),
            author_ids: Some(vec![]),
            publisher_id: Some(PublisherId::new(-3)),
            ..Default::default()
        };
        assert!(command.sanitize().is_empty());
    }

    mod engine {
        use super::*;
        use crate::database::ports::books::MockBookStore;

        fn sample_book() -> Book {
            Book {
                pkid: BookId::new(1),
                title: "T".into(),
                isbn: "X1".into(),
                price: 10.0,
                edition: "1st".into(),
                printing: "2025-01".into(),
                image_url: "http://example.com/x.jpg".into(),
                remark: None,
                author_ids: vec![AuthorId::new(7)],
                translator_ids: vec![],
                publisher_id: PublisherId::new(1),
            }
        }

        fn create_command() -> CreateBookCommand {
            CreateBookCommand {
                title: "T".into(),
                isbn: "X1".into(),
                price: 10.0,
                edition: "1st".into(),
                printing: "2025-01".into(),
                image_url: "http://example.com/x.jpg".into(),
                remark: None,
                author_ids: vec![AuthorId::new(7)],
                translator_ids: vec![],
                publisher_id: PublisherId::new(1),
            }
        }

        #[tokio::test]
        async fn create_rejects_duplicate_isbn_before_writing() {
            let mut books = MockBookStore::new();
            books
                .expect_find_by_isbn()
                .returning(|_| Ok(Some(sample_book())));
            books.expect_create().never();

            let engine = CatalogService::new(Arc::new(books));
            let err = engine.create(create_command()).await.unwrap_err();
            assert!(matches!(err, CatalogError::AlreadyExists { .. }));
        }

        #[tokio::test]
        async fn create_requires_an_author() {
            let mut books = MockBookStore::new();
            books.expect_find_by_isbn().never();
            books.expect_create().never();

            let engine = CatalogService::new(Arc::new(books));
            let command = CreateBookCommand {
                author_ids: vec![],
                ..create_command()
            };
            let err = engine.create(command).await.unwrap_err();
            assert!(matches!(err, CatalogError::Validation(_)));
        }

        #[tokio::test]
        async fn update_with_nothing_effective_is_rejected_without_store_io() {
            let mut books = MockBookStore::new();
            books.expect_find_by_isbn().never();
            books.expect_update().never();

            let engine = CatalogService::new(Arc::new(books));
            let err = engine
                .update(BookId::new(1), UpdateBookCommand::default())
                .await
                .unwrap_err();
            assert!(matches!(err, CatalogError::Validation(_)));
        }

        #[tokio::test]
        async fn update_isbn_colliding_with_other_book_is_a_conflict() {
            let mut books = MockBookStore::new();
            books.expect_find_by_isbn().returning(|_| {
                Ok(Some(Book {
                    pkid: BookId::new(2),
                    ..sample_book()
                }))
            });
            books.expect_update().never();

            let engine = CatalogService::new(Arc::new(books));
            let command = UpdateBookCommand {
                isbn: Some("X1".to_string()),
                ..Default::default()
            };
            let err = engine.update(BookId::new(1), command).await.unwrap_err();
            assert!(matches!(err, CatalogError::AlreadyExists { .. }));
        }

        #[tokio::test]
        async fn update_keeping_own_isbn_is_allowed() {
            let mut books = MockBookStore::new();
            books
                .expect_find_by_isbn()
                .returning(|_| Ok(Some(sample_book())));
            books
                .expect_update()
                .times(1)
                .returning(|_, _| Ok(sample_book()));

            let engine = CatalogService::new(Arc::new(books));
            let command = UpdateBookCommand {
                isbn: Some("X1".to_string()),
                ..Default::default()
            };
            engine.update(BookId::new(1), command).await.unwrap();
        }

        #[tokio::test]
        async fn delete_of_absent_book_is_not_found() {
            let mut books = MockBookStore::new();
            books.expect_delete().returning(|_| Ok(false));

            let engine = CatalogService::new(Arc::new(books));
            let err = engine.delete(BookId::new(99)).await.unwrap_err();
            assert!(matches!(err, CatalogError::NotFound { .. }));
        }
    }
}
