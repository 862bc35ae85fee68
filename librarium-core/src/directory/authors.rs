use std::sync::Arc;

use librarium_model::{Author, AuthorId};
use tracing::info;

use crate::catalog::CatalogService;
use crate::database::ports::authors::{AuthorChanges, AuthorStore, NewAuthor};
use crate::error::{CatalogError, Result};

/// Owns author records and guards their deletion against book
/// back-references in both roles. Author names are not required to be
/// unique.
#[derive(Clone)]
pub struct AuthorDirectory {
    authors: Arc<dyn AuthorStore>,
    catalog: CatalogService,
}

impl std::fmt::Debug for AuthorDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorDirectory").finish_non_exhaustive()
    }
}

impl AuthorDirectory {
    pub fn new(authors: Arc<dyn AuthorStore>, catalog: CatalogService) -> Self {
        Self { authors, catalog }
    }

    pub async fn create(&self, draft: NewAuthor) -> Result<Author> {
        if draft.name.trim().is_empty() {
            return Err(CatalogError::Validation(
                "author name must not be blank".to_string(),
            ));
        }
        self.authors.create(&draft).await
    }

    pub async fn find_by_pkid(&self, pkid: AuthorId) -> Result<Option<Author>> {
        self.authors.find_by_pkid(pkid).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Author>> {
        self.authors.find_by_name(name).await
    }

    pub async fn list(&self) -> Result<Vec<Author>> {
        self.authors.list().await
    }

    pub async fn update(&self, pkid: AuthorId, changes: AuthorChanges) -> Result<Author> {
        if self.authors.find_by_pkid(pkid).await?.is_none() {
            return Err(CatalogError::not_found("Author", pkid));
        }
        if let Some(name) = &changes.name {
            if name.trim().is_empty() {
                return Err(CatalogError::Validation(
                    "author name must not be blank".to_string(),
                ));
            }
        }
        self.authors.update(pkid, &changes).await
    }

    /// Deletes an author. The reference counts for both roles are
    /// consulted before the destructive write is ever issued; a positive
    /// total blocks the deletion and is reported to the caller.
    pub async fn delete(&self, pkid: AuthorId) -> Result<()> {
        let authored = self.catalog.count_by_author(pkid).await?;
        let translated = self.catalog.count_by_translator(pkid).await?;
        let blocking = authored + translated;
        if blocking > 0 {
            return Err(CatalogError::RelatedEntity {
                entity: "Author",
                key: pkid.as_i64(),
                count: blocking,
            });
        }

        if self.authors.find_by_pkid(pkid).await?.is_none() {
            return Err(CatalogError::not_found("Author", pkid));
        }
        if !self.authors.delete(pkid).await? {
            // Lost a race with another delete between the check and here.
            return Err(CatalogError::not_found("Author", pkid));
        }
        info!("removed author {}", pkid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ports::authors::MockAuthorStore;
    use crate::database::ports::books::MockBookStore;

    fn author(pkid: i64, name: &str) -> Author {
        Author {
            pkid: AuthorId::new(pkid),
            name: name.to_string(),
            country: None,
            birth_date: None,
            death_date: None,
            introduction: None,
        }
    }

    fn catalog_counting(authored: i64, translated: i64) -> CatalogService {
        let mut books = MockBookStore::new();
        books
            .expect_count_by_author()
            .returning(move |_| Ok(authored));
        books
            .expect_count_by_translator()
            .returning(move |_| Ok(translated));
        CatalogService::new(Arc::new(books))
    }

    #[tokio::test]
    async fn delete_is_blocked_while_either_role_is_referenced() {
        let mut authors = MockAuthorStore::new();
        // The guard fires before any row access.
        authors.expect_find_by_pkid().never();
        authors.expect_delete().never();

        let directory = AuthorDirectory::new(Arc::new(authors), catalog_counting(1, 2));
        let err = directory.delete(AuthorId::new(7)).await.unwrap_err();
        match err {
            CatalogError::RelatedEntity { entity, key, count } => {
                assert_eq!(entity, "Author");
                assert_eq!(key, 7);
                assert_eq!(count, 3);
            }
            other => panic!("expected RelatedEntity, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn translator_only_references_still_block_deletion() {
        let mut authors = MockAuthorStore::new();
        authors.expect_delete().never();

        let directory = AuthorDirectory::new(Arc::new(authors), catalog_counting(0, 1));
        let err = directory.delete(AuthorId::new(7)).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::RelatedEntity { count: 1, .. }
        ));
    }

    #[tokio::test]
    async fn unreferenced_author_is_deleted() {
        let mut authors = MockAuthorStore::new();
        authors
            .expect_find_by_pkid()
            .returning(|pkid| Ok(Some(author(pkid.as_i64(), "Ada"))));
        authors.expect_delete().times(1).returning(|_| Ok(true));

        let directory = AuthorDirectory::new(Arc::new(authors), catalog_counting(0, 0));
        directory.delete(AuthorId::new(7)).await.unwrap();
    }

    #[tokio::test]
    async fn delete_of_absent_author_is_not_found() {
        let mut authors = MockAuthorStore::new();
        authors.expect_find_by_pkid().returning(|_| Ok(None));
        authors.expect_delete().never();

        let directory = AuthorDirectory::new(Arc::new(authors), catalog_counting(0, 0));
        let err = directory.delete(AuthorId::new(7)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn create_rejects_blank_names() {
        let mut authors = MockAuthorStore::new();
        authors.expect_create().never();

        let directory = AuthorDirectory::new(
            Arc::new(authors),
            CatalogService::new(Arc::new(MockBookStore::new())),
        );
        let err = directory
            .create(NewAuthor::from_name("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn update_of_absent_author_is_not_found() {
        let mut authors = MockAuthorStore::new();
        authors.expect_find_by_pkid().returning(|_| Ok(None));
        authors.expect_update().never();

        let directory = AuthorDirectory::new(
            Arc::new(authors),
            CatalogService::new(Arc::new(MockBookStore::new())),
        );
        let err = directory
            .update(AuthorId::new(9), AuthorChanges::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
