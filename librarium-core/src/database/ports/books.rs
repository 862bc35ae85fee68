use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use librarium_model::{AuthorId, Book, BookDetails, BookId, PublisherId};

use crate::error::Result;

/// Draft of a book row plus its relation sets, as persisted by
/// [`BookStore::create`]. Relation lists carry already-resolved keys; the
/// store validates their existence through its foreign-key writes.
#[derive(Debug, Clone)]
pub struct NewBook {
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

/// Pending change to one of a book's join sets.
///
/// `Replace` discards the entire previous set and installs exactly the new
/// one; there is no merge operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JoinSetChange {
    #[default]
    Keep,
    Replace(Vec<AuthorId>),
    Clear,
}

impl JoinSetChange {
    pub fn is_keep(&self) -> bool {
        matches!(self, JoinSetChange::Keep)
    }
}

/// Partial update of a book. `None` / `Keep` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub price: Option<f64>,
    pub edition: Option<String>,
    pub printing: Option<String>,
    pub image_url: Option<String>,
    pub remark: Option<String>,

    pub authors: JoinSetChange,
    pub translators: JoinSetChange,
    pub publisher_id: Option<PublisherId>,
}

impl BookChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.isbn.is_none()
            && self.price.is_none()
            && self.edition.is_none()
            && self.printing.is_none()
            && self.image_url.is_none()
            && self.remark.is_none()
            && self.authors.is_keep()
            && self.translators.is_keep()
            && self.publisher_id.is_none()
    }

    pub fn has_scalar_changes(&self) -> bool {
        self.title.is_some()
            || self.isbn.is_some()
            || self.price.is_some()
            || self.edition.is_some()
            || self.printing.is_some()
            || self.image_url.is_some()
            || self.remark.is_some()
            || self.publisher_id.is_some()
    }
}

/// Persistence contract for books and their join relations.
///
/// `create` and `update` are transactional: the book row, its two join
/// sets, and the publisher foreign key commit together or not at all.
/// Join rows are owned by the book outright, so `delete` cascades them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn create(&self, draft: &NewBook) -> Result<Book>;

    async fn find_by_pkid(&self, pkid: BookId) -> Result<Option<BookDetails>>;

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    async fn list(&self) -> Result<Vec<BookDetails>>;

    /// Applies the change set atomically. A named join set is fully
    /// replaced (delete-then-recreate), never merged. Fails with
    /// `NotFound` when the book does not exist.
    async fn update(&self, pkid: BookId, changes: &BookChanges) -> Result<Book>;

    /// Returns `false` when the book was already absent.
    async fn delete(&self, pkid: BookId) -> Result<bool>;

    async fn count_by_author(&self, author: AuthorId) -> Result<i64>;

    async fn count_by_translator(&self, translator: AuthorId) -> Result<i64>;

    async fn count_by_publisher(&self, publisher: PublisherId) -> Result<i64>;
}
