use async_trait::async_trait;
use chrono::NaiveDate;
#[cfg(test)]
use mockall::automock;

use librarium_model::{Author, AuthorId};

use crate::error::Result;

/// Draft of an author row. Only the name is required; relation-resolved
/// translators routinely arrive as a bare name.
#[derive(Debug, Clone, Default)]
pub struct NewAuthor {
    pub name: String,
    pub country: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub introduction: Option<String>,
}

impl NewAuthor {
    pub fn from_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update of an author; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct AuthorChanges {
    pub name: Option<String>,
    pub country: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub introduction: Option<String>,
}

impl AuthorChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.country.is_none()
            && self.birth_date.is_none()
            && self.death_date.is_none()
            && self.introduction.is_none()
    }
}

/// Persistence contract for author rows. Author names are not unique;
/// `find_by_name` returns the first match in storage order.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn create(&self, draft: &NewAuthor) -> Result<Author>;

    async fn find_by_pkid(&self, pkid: AuthorId) -> Result<Option<Author>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Author>>;

    async fn list(&self) -> Result<Vec<Author>>;

    /// Fails with `NotFound` when the author does not exist.
    async fn update(&self, pkid: AuthorId, changes: &AuthorChanges) -> Result<Author>;

    /// Returns `false` when the author was already absent. The store's
    /// foreign keys refuse deletion while join rows still reference the
    /// author; the directory's guards are expected to fire first.
    async fn delete(&self, pkid: AuthorId) -> Result<bool>;
}
