//! In-memory entity store.
//!
//! Implements every port over locked maps with the same observable
//! behavior as the PostgreSQL adapter: serial key assignment, unique
//! constraints on isbn and publisher name, foreign-key existence on join
//! writes, and join-row cascade when a book is deleted. Backs the engine
//! test-suite and ephemeral deployments.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use librarium_model::{
    Author, AuthorId, AuthorSummary, Book, BookDetails, BookId, Publisher, PublisherId,
    PublisherSummary, User, UserId,
};

use crate::database::ports::{
    AuthorChanges, AuthorStore, BookChanges, BookStore, JoinSetChange, NewAuthor, NewBook,
    NewPublisher, NewUser, PublisherChanges, PublisherStore, UserChanges, UserStore,
};
use crate::error::{CatalogError, Result};

#[derive(Debug, Clone)]
struct BookRow {
    title: String,
    isbn: String,
    price: f64,
    edition: String,
    printing: String,
    image_url: String,
    remark: Option<String>,
    publisher_id: PublisherId,
}

#[derive(Debug, Default)]
struct Tables {
    books: BTreeMap<i64, BookRow>,
    // Join rows in insertion order, (book, author) pairs.
    book_authors: Vec<(i64, i64)>,
    book_translators: Vec<(i64, i64)>,
    authors: BTreeMap<i64, Author>,
    publishers: BTreeMap<i64, Publisher>,
    users: BTreeMap<i64, User>,
    next_book: i64,
    next_author: i64,
    next_publisher: i64,
    next_user: i64,
}

impl Tables {
    fn author_ids_of(&self, book: i64) -> Vec<AuthorId> {
        self.book_authors
            .iter()
            .filter(|(b, _)| *b == book)
            .map(|(_, a)| AuthorId::new(*a))
            .collect()
    }

    fn translator_ids_of(&self, book: i64) -> Vec<AuthorId> {
        self.book_translators
            .iter()
            .filter(|(b, _)| *b == book)
            .map(|(_, a)| AuthorId::new(*a))
            .collect()
    }

    fn assemble_book(&self, pkid: i64) -> Option<Book> {
        let row = self.books.get(&pkid)?;
        Some(Book {
            pkid: BookId::new(pkid),
            title: row.title.clone(),
            isbn: row.isbn.clone(),
            price: row.price,
            edition: row.edition.clone(),
            printing: row.printing.clone(),
            image_url: row.image_url.clone(),
            remark: row.remark.clone(),
            author_ids: self.author_ids_of(pkid),
            translator_ids: self.translator_ids_of(pkid),
            publisher_id: row.publisher_id,
        })
    }

    fn assemble_details(&self, pkid: i64) -> Option<BookDetails> {
        let book = self.assemble_book(pkid)?;
        let summarize = |ids: &[AuthorId]| -> Vec<AuthorSummary> {
            ids.iter()
                .filter_map(|id| self.authors.get(&id.as_i64()))
                .map(|a| AuthorSummary {
                    pkid: a.pkid,
                    name: a.name.clone(),
                })
                .collect()
        };
        let authors = summarize(&book.author_ids);
        let translators = summarize(&book.translator_ids);
        let publisher = self.publishers.get(&book.publisher_id.as_i64())?;
        let publisher = PublisherSummary {
            pkid: publisher.pkid,
            name: publisher.name.clone(),
        };
        Some(BookDetails {
            book,
            authors,
            translators,
            publisher,
        })
    }

    fn check_author_refs(&self, ids: &[AuthorId]) -> Result<()> {
        let mut seen = Vec::with_capacity(ids.len());
        for id in ids {
            if !self.authors.contains_key(&id.as_i64()) {
                return Err(CatalogError::Validation(format!(
                    "referenced author {id} does not exist"
                )));
            }
            if seen.contains(id) {
                return Err(CatalogError::Validation(format!(
                    "duplicate author {id} in relation set"
                )));
            }
            seen.push(*id);
        }
        Ok(())
    }

    fn check_publisher_ref(&self, id: PublisherId) -> Result<()> {
        if !self.publishers.contains_key(&id.as_i64()) {
            return Err(CatalogError::Validation(format!(
                "referenced publisher {id} does not exist"
            )));
        }
        Ok(())
    }

    fn replace_join_set(joins: &mut Vec<(i64, i64)>, book: i64, ids: &[AuthorId]) {
        joins.retain(|(b, _)| *b != book);
        joins.extend(ids.iter().map(|id| (book, id.as_i64())));
    }
}

/// Shared in-memory store; clone the [`std::sync::Arc`] it lives in to
/// hand the same tables to every port consumer.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn create(&self, draft: &NewBook) -> Result<Book> {
        let mut tables = self.tables.write().await;

        if tables.books.values().any(|row| row.isbn == draft.isbn) {
            return Err(CatalogError::Conflict(format!(
                "isbn \"{}\" already exists",
                draft.isbn
            )));
        }
        tables.check_publisher_ref(draft.publisher_id)?;
        tables.check_author_refs(&draft.author_ids)?;
        tables.check_author_refs(&draft.translator_ids)?;

        tables.next_book += 1;
        let pkid = tables.next_book;
        tables.books.insert(
            pkid,
            BookRow {
                title: draft.title.clone(),
                isbn: draft.isbn.clone(),
                price: draft.price,
                edition: draft.edition.clone(),
                printing: draft.printing.clone(),
                image_url: draft.image_url.clone(),
                remark: draft.remark.clone(),
                publisher_id: draft.publisher_id,
            },
        );
        for id in &draft.author_ids {
            tables.book_authors.push((pkid, id.as_i64()));
        }
        for id in &draft.translator_ids {
            tables.book_translators.push((pkid, id.as_i64()));
        }

        Ok(tables
            .assemble_book(pkid)
            .expect("book row was just inserted"))
    }

    async fn find_by_pkid(&self, pkid: BookId) -> Result<Option<BookDetails>> {
        let tables = self.tables.read().await;
        Ok(tables.assemble_details(pkid.as_i64()))
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let tables = self.tables.read().await;
        let pkid = tables
            .books
            .iter()
            .find(|(_, row)| row.isbn == isbn)
            .map(|(pkid, _)| *pkid);
        Ok(pkid.and_then(|pkid| tables.assemble_book(pkid)))
    }

    async fn list(&self) -> Result<Vec<BookDetails>> {
        let tables = self.tables.read().await;
        let pkids: Vec<i64> = tables.books.keys().copied().collect();
        Ok(pkids
            .into_iter()
            .filter_map(|pkid| tables.assemble_details(pkid))
            .collect())
    }

    async fn update(&self, pkid: BookId, changes: &BookChanges) -> Result<Book> {
        let mut tables = self.tables.write().await;
        let key = pkid.as_i64();

        if !tables.books.contains_key(&key) {
            return Err(CatalogError::not_found("Book", pkid));
        }
        if let Some(isbn) = &changes.isbn {
            let collides = tables
                .books
                .iter()
                .any(|(other, row)| *other != key && row.isbn == *isbn);
            if collides {
                return Err(CatalogError::Conflict(format!(
                    "isbn \"{isbn}\" already exists"
                )));
            }
        }
        if let Some(publisher_id) = changes.publisher_id {
            tables.check_publisher_ref(publisher_id)?;
        }
        if let JoinSetChange::Replace(ids) = &changes.authors {
            tables.check_author_refs(ids)?;
        }
        if let JoinSetChange::Replace(ids) = &changes.translators {
            tables.check_author_refs(ids)?;
        }

        {
            let row = tables
                .books
                .get_mut(&key)
                .expect("book row presence was just checked");
            if let Some(title) = &changes.title {
                row.title = title.clone();
            }
            if let Some(isbn) = &changes.isbn {
                row.isbn = isbn.clone();
            }
            if let Some(price) = changes.price {
                row.price = price;
            }
            if let Some(edition) = &changes.edition {
                row.edition = edition.clone();
            }
            if let Some(printing) = &changes.printing {
                row.printing = printing.clone();
            }
            if let Some(image_url) = &changes.image_url {
                row.image_url = image_url.clone();
            }
            if let Some(remark) = &changes.remark {
                row.remark = Some(remark.clone());
            }
            if let Some(publisher_id) = changes.publisher_id {
                row.publisher_id = publisher_id;
            }
        }

        match &changes.authors {
            JoinSetChange::Keep => {}
            JoinSetChange::Replace(ids) => {
                Tables::replace_join_set(&mut tables.book_authors, key, ids);
            }
            JoinSetChange::Clear => Tables::replace_join_set(&mut tables.book_authors, key, &[]),
        }
        match &changes.translators {
            JoinSetChange::Keep => {}
            JoinSetChange::Replace(ids) => {
                Tables::replace_join_set(&mut tables.book_translators, key, ids);
            }
            JoinSetChange::Clear => {
                Tables::replace_join_set(&mut tables.book_translators, key, &[]);
            }
        }

        Ok(tables
            .assemble_book(key)
            .expect("book row presence was just checked"))
    }

    async fn delete(&self, pkid: BookId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let key = pkid.as_i64();
        if tables.books.remove(&key).is_none() {
            return Ok(false);
        }
        // Book owns its join rows outright: cascade.
        tables.book_authors.retain(|(b, _)| *b != key);
        tables.book_translators.retain(|(b, _)| *b != key);
        Ok(true)
    }

    async fn count_by_author(&self, author: AuthorId) -> Result<i64> {
        let tables = self.tables.read().await;
        let key = author.as_i64();
        Ok(tables.book_authors.iter().filter(|(_, a)| *a == key).count() as i64)
    }

    async fn count_by_translator(&self, translator: AuthorId) -> Result<i64> {
        let tables = self.tables.read().await;
        let key = translator.as_i64();
        Ok(tables
            .book_translators
            .iter()
            .filter(|(_, a)| *a == key)
            .count() as i64)
    }

    async fn count_by_publisher(&self, publisher: PublisherId) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .filter(|row| row.publisher_id == publisher)
            .count() as i64)
    }
}

#[async_trait]
impl AuthorStore for MemoryStore {
    async fn create(&self, draft: &NewAuthor) -> Result<Author> {
        let mut tables = self.tables.write().await;
        tables.next_author += 1;
        let pkid = tables.next_author;
        let author = Author {
            pkid: AuthorId::new(pkid),
            name: draft.name.clone(),
            country: draft.country.clone(),
            birth_date: draft.birth_date,
            death_date: draft.death_date,
            introduction: draft.introduction.clone(),
        };
        tables.authors.insert(pkid, author.clone());
        Ok(author)
    }

    async fn find_by_pkid(&self, pkid: AuthorId) -> Result<Option<Author>> {
        let tables = self.tables.read().await;
        Ok(tables.authors.get(&pkid.as_i64()).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Author>> {
        let tables = self.tables.read().await;
        Ok(tables.authors.values().find(|a| a.name == name).cloned())
    }

    async fn list(&self) -> Result<Vec<Author>> {
        let tables = self.tables.read().await;
        Ok(tables.authors.values().cloned().collect())
    }

    async fn update(&self, pkid: AuthorId, changes: &AuthorChanges) -> Result<Author> {
        let mut tables = self.tables.write().await;
        let author = tables
            .authors
            .get_mut(&pkid.as_i64())
            .ok_or_else(|| CatalogError::not_found("Author", pkid))?;
        if let Some(name) = &changes.name {
            author.name = name.clone();
        }
        if let Some(country) = &changes.country {
            author.country = Some(country.clone());
        }
        if let Some(birth_date) = changes.birth_date {
            author.birth_date = Some(birth_date);
        }
        if let Some(death_date) = changes.death_date {
            author.death_date = Some(death_date);
        }
        if let Some(introduction) = &changes.introduction {
            author.introduction = Some(introduction.clone());
        }
        Ok(author.clone())
    }

    async fn delete(&self, pkid: AuthorId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let key = pkid.as_i64();
        if !tables.authors.contains_key(&key) {
            return Ok(false);
        }
        // Constraint backstop, mirrors the FK restriction in Postgres. The
        // directory guard is expected to have fired before this point.
        let referenced = tables.book_authors.iter().any(|(_, a)| *a == key)
            || tables.book_translators.iter().any(|(_, a)| *a == key);
        if referenced {
            return Err(CatalogError::Conflict(format!(
                "author {pkid} is still referenced by book relations"
            )));
        }
        tables.authors.remove(&key);
        Ok(true)
    }
}

#[async_trait]
impl PublisherStore for MemoryStore {
    async fn create(&self, draft: &NewPublisher) -> Result<Publisher> {
        let mut tables = self.tables.write().await;
        if tables.publishers.values().any(|p| p.name == draft.name) {
            return Err(CatalogError::Conflict(format!(
                "publisher name \"{}\" already exists",
                draft.name
            )));
        }
        tables.next_publisher += 1;
        let pkid = tables.next_publisher;
        let publisher = Publisher {
            pkid: PublisherId::new(pkid),
            name: draft.name.clone(),
        };
        tables.publishers.insert(pkid, publisher.clone());
        Ok(publisher)
    }

    async fn find_by_pkid(&self, pkid: PublisherId) -> Result<Option<Publisher>> {
        let tables = self.tables.read().await;
        Ok(tables.publishers.get(&pkid.as_i64()).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Publisher>> {
        let tables = self.tables.read().await;
        Ok(tables.publishers.values().find(|p| p.name == name).cloned())
    }

    async fn list(&self) -> Result<Vec<Publisher>> {
        let tables = self.tables.read().await;
        Ok(tables.publishers.values().cloned().collect())
    }

    async fn update(&self, pkid: PublisherId, changes: &PublisherChanges) -> Result<Publisher> {
        let mut tables = self.tables.write().await;
        let key = pkid.as_i64();
        if !tables.publishers.contains_key(&key) {
            return Err(CatalogError::not_found("Publisher", pkid));
        }
        if let Some(name) = &changes.name {
            let collides = tables
                .publishers
                .iter()
                .any(|(other, p)| *other != key && p.name == *name);
            if collides {
                return Err(CatalogError::Conflict(format!(
                    "publisher name \"{name}\" already exists"
                )));
            }
            let publisher = tables
                .publishers
                .get_mut(&key)
                .expect("publisher presence was just checked");
            publisher.name = name.clone();
        }
        Ok(tables
            .publishers
            .get(&key)
            .cloned()
            .expect("publisher presence was just checked"))
    }

    async fn delete(&self, pkid: PublisherId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let key = pkid.as_i64();
        if !tables.publishers.contains_key(&key) {
            return Ok(false);
        }
        let referenced = tables
            .books
            .values()
            .any(|row| row.publisher_id.as_i64() == key);
        if referenced {
            return Err(CatalogError::Conflict(format!(
                "publisher {pkid} is still referenced by books"
            )));
        }
        tables.publishers.remove(&key);
        Ok(true)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, draft: &NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        tables.next_user += 1;
        let pkid = tables.next_user;
        let user = User {
            pkid: UserId::new(pkid),
            name: draft.name.clone(),
            email: draft.email.clone(),
            birthdate: draft.birthdate,
            gender: draft.gender,
            height: draft.height,
            status: draft.status,
        };
        tables.users.insert(pkid, user.clone());
        Ok(user)
    }

    async fn find_by_pkid(&self, pkid: UserId) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&pkid.as_i64()).cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().cloned().collect())
    }

    async fn update(&self, pkid: UserId, changes: &UserChanges) -> Result<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&pkid.as_i64())
            .ok_or_else(|| CatalogError::not_found("User", pkid))?;
        if let Some(name) = &changes.name {
            user.name = name.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(birthdate) = changes.birthdate {
            user.birthdate = birthdate;
        }
        if let Some(gender) = changes.gender {
            user.gender = gender;
        }
        if let Some(height) = changes.height {
            user.height = height;
        }
        if let Some(status) = changes.status {
            user.status = status;
        }
        Ok(user.clone())
    }

    async fn delete(&self, pkid: UserId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.remove(&pkid.as_i64()).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, AuthorId, PublisherId) {
        let store = MemoryStore::new();
        let author = AuthorStore::create(&store, &NewAuthor::from_name("Ada"))
            .await
            .unwrap();
        let publisher = PublisherStore::create(
            &store,
            &NewPublisher {
                name: "Acme".into(),
            },
        )
        .await
        .unwrap();
        (store, author.pkid, publisher.pkid)
    }

    fn draft(isbn: &str, authors: Vec<AuthorId>, publisher: PublisherId) -> NewBook {
        NewBook {
            title: "T".into(),
            isbn: isbn.into(),
            price: 10.0,
            edition: "1st".into(),
            printing: "2025-01".into(),
            image_url: "http://example.com/x.jpg".into(),
            remark: None,
            author_ids: authors,
            translator_ids: vec![],
            publisher_id: publisher,
        }
    }

    #[tokio::test]
    async fn duplicate_isbn_is_a_store_conflict() {
        let (store, author, publisher) = seeded().await;
        BookStore::create(&store, &draft("X1", vec![author], publisher))
            .await
            .unwrap();
        let err = BookStore::create(&store, &draft("X1", vec![author], publisher))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));
    }

    #[tokio::test]
    async fn dangling_author_reference_is_rejected() {
        let (store, _, publisher) = seeded().await;
        let err = BookStore::create(&store, &draft("X1", vec![AuthorId::new(99)], publisher))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn deleting_a_book_cascades_its_join_rows() {
        let (store, author, publisher) = seeded().await;
        let book = BookStore::create(&store, &draft("X1", vec![author], publisher))
            .await
            .unwrap();
        assert_eq!(BookStore::count_by_author(&store, author).await.unwrap(), 1);

        assert!(BookStore::delete(&store, book.pkid).await.unwrap());
        assert_eq!(BookStore::count_by_author(&store, author).await.unwrap(), 0);
        // The author row itself is untouched by the cascade.
        assert!(AuthorStore::delete(&store, author).await.unwrap());
    }

    #[tokio::test]
    async fn referenced_author_delete_hits_the_constraint_backstop() {
        let (store, author, publisher) = seeded().await;
        BookStore::create(&store, &draft("X1", vec![author], publisher))
            .await
            .unwrap();
        let err = AuthorStore::delete(&store, author).await.unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_of_absent_rows_reports_not_applicable() {
        let store = MemoryStore::new();
        assert!(!BookStore::delete(&store, BookId::new(1)).await.unwrap());
        assert!(!AuthorStore::delete(&store, AuthorId::new(1)).await.unwrap());
        assert!(
            !PublisherStore::delete(&store, PublisherId::new(1))
                .await
                .unwrap()
        );
    }
}
