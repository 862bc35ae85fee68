use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use librarium_model::{Publisher, PublisherId};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewPublisher {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct PublisherChanges {
    pub name: Option<String>,
}

/// Persistence contract for publisher rows. The store enforces name
/// uniqueness as a constraint-layer backstop; the directory pre-checks it
/// proactively.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PublisherStore: Send + Sync {
    async fn create(&self, draft: &NewPublisher) -> Result<Publisher>;

    async fn find_by_pkid(&self, pkid: PublisherId) -> Result<Option<Publisher>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Publisher>>;

    async fn list(&self) -> Result<Vec<Publisher>>;

    /// Fails with `NotFound` when the publisher does not exist.
    async fn update(&self, pkid: PublisherId, changes: &PublisherChanges) -> Result<Publisher>;

    /// Returns `false` when the publisher was already absent.
    async fn delete(&self, pkid: PublisherId) -> Result<bool>;
}
