use std::sync::Arc;

use librarium_model::{Publisher, PublisherId};
use tracing::info;

use crate::catalog::CatalogService;
use crate::database::ports::publishers::{NewPublisher, PublisherChanges, PublisherStore};
use crate::error::{CatalogError, Result};

/// Owns publisher records, enforces name uniqueness, and guards deletion
/// against book back-references.
#[derive(Clone)]
pub struct PublisherDirectory {
    publishers: Arc<dyn PublisherStore>,
    catalog: CatalogService,
}

impl std::fmt::Debug for PublisherDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherDirectory").finish_non_exhaustive()
    }
}

impl PublisherDirectory {
    pub fn new(publishers: Arc<dyn PublisherStore>, catalog: CatalogService) -> Self {
        Self {
            publishers,
            catalog,
        }
    }

    /// Creates a publisher; the name must be globally unique. The
    /// pre-check classifies the collision, the store constraint backs it
    /// up.
    pub async fn create(&self, draft: NewPublisher) -> Result<Publisher> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(CatalogError::Validation(
                "publisher name must not be blank".to_string(),
            ));
        }
        if self.publishers.find_by_name(name).await?.is_some() {
            return Err(CatalogError::already_exists("Publisher", name));
        }
        self.publishers
            .create(&NewPublisher {
                name: name.to_string(),
            })
            .await
    }

    pub async fn find_by_pkid(&self, pkid: PublisherId) -> Result<Option<Publisher>> {
        self.publishers.find_by_pkid(pkid).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Publisher>> {
        self.publishers.find_by_name(name).await
    }

    pub async fn list(&self) -> Result<Vec<Publisher>> {
        self.publishers.list().await
    }

    pub async fn update(&self, pkid: PublisherId, changes: PublisherChanges) -> Result<Publisher> {
        if self.publishers.find_by_pkid(pkid).await?.is_none() {
            return Err(CatalogError::not_found("Publisher", pkid));
        }
        if let Some(name) = &changes.name {
            if name.trim().is_empty() {
                return Err(CatalogError::Validation(
                    "publisher name must not be blank".to_string(),
                ));
            }
            if let Some(existing) = self.publishers.find_by_name(name).await? {
                if existing.pkid != pkid {
                    return Err(CatalogError::already_exists("Publisher", name.clone()));
                }
            }
        }
        self.publishers.update(pkid, &changes).await
    }

    /// Deletes a publisher. The catalog reference count is consulted
    /// before the destructive write is ever issued.
    pub async fn delete(&self, pkid: PublisherId) -> Result<()> {
        let blocking = self.catalog.count_by_publisher(pkid).await?;
        if blocking > 0 {
            return Err(CatalogError::RelatedEntity {
                entity: "Publisher",
                key: pkid.as_i64(),
                count: blocking,
            });
        }

        if self.publishers.find_by_pkid(pkid).await?.is_none() {
            return Err(CatalogError::not_found("Publisher", pkid));
        }
        if !self.publishers.delete(pkid).await? {
            return Err(CatalogError::not_found("Publisher", pkid));
        }
        info!("removed publisher {}", pkid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ports::books::MockBookStore;
    use crate::database::ports::publishers::MockPublisherStore;

    fn publisher(pkid: i64, name: &str) -> Publisher {
        Publisher {
            pkid: PublisherId::new(pkid),
            name: name.to_string(),
        }
    }

    fn catalog_counting(count: i64) -> CatalogService {
        let mut books = MockBookStore::new();
        books
            .expect_count_by_publisher()
            .returning(move |_| Ok(count));
        CatalogService::new(Arc::new(books))
    }

    fn no_catalog() -> CatalogService {
        CatalogService::new(Arc::new(MockBookStore::new()))
    }

    #[tokio::test]
    async fn create_rejects_duplicate_names() {
        let mut publishers = MockPublisherStore::new();
        publishers
            .expect_find_by_name()
            .returning(|name| Ok(Some(publisher(1, name))));
        publishers.expect_create().never();

        let directory = PublisherDirectory::new(Arc::new(publishers), no_catalog());
        let err = directory
            .create(NewPublisher {
                name: "Acme".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn rename_colliding_with_another_row_is_rejected() {
        let mut publishers = MockPublisherStore::new();
        publishers
            .expect_find_by_pkid()
            .returning(|pkid| Ok(Some(publisher(pkid.as_i64(), "Old"))));
        publishers
            .expect_find_by_name()
            .returning(|name| Ok(Some(publisher(2, name))));
        publishers.expect_update().never();

        let directory = PublisherDirectory::new(Arc::new(publishers), no_catalog());
        let err = directory
            .update(
                PublisherId::new(1),
                PublisherChanges {
                    name: Some("Taken".into()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn rename_to_own_name_is_allowed() {
        let mut publishers = MockPublisherStore::new();
        publishers
            .expect_find_by_pkid()
            .returning(|pkid| Ok(Some(publisher(pkid.as_i64(), "Same"))));
        publishers
            .expect_find_by_name()
            .returning(|name| Ok(Some(publisher(1, name))));
        publishers
            .expect_update()
            .times(1)
            .returning(|pkid, changes| {
                Ok(publisher(
                    pkid.as_i64(),
                    changes.name.as_deref().unwrap_or("Same"),
                ))
            });

        let directory = PublisherDirectory::new(Arc::new(publishers), no_catalog());
        directory
            .update(
                PublisherId::new(1),
                PublisherChanges {
                    name: Some("Same".into()),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_is_blocked_while_books_reference_the_publisher() {
        let mut publishers = MockPublisherStore::new();
        publishers.expect_find_by_pkid().never();
        publishers.expect_delete().never();

        let directory = PublisherDirectory::new(Arc::new(publishers), catalog_counting(4));
        let err = directory.delete(PublisherId::new(3)).await.unwrap_err();
        match err {
            CatalogError::RelatedEntity { entity, key, count } => {
                assert_eq!(entity, "Publisher");
                assert_eq!(key, 3);
                assert_eq!(count, 4);
            }
            other => panic!("expected RelatedEntity, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreferenced_publisher_is_deleted() {
        let mut publishers = MockPublisherStore::new();
        publishers
            .expect_find_by_pkid()
            .returning(|pkid| Ok(Some(publisher(pkid.as_i64(), "Acme"))));
        publishers.expect_delete().times(1).returning(|_| Ok(true));

        let directory = PublisherDirectory::new(Arc::new(publishers), catalog_counting(0));
        directory.delete(PublisherId::new(3)).await.unwrap();
    }
}
