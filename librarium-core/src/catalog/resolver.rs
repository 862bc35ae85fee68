//! Relation resolution: ID-or-name inputs to concrete key lists.
//!
//! A write request may reference authors, translators, and the publisher
//! either by existing keys or by bare names to create. This module turns
//! that mixed input into resolved key lists, creating rows as needed.
//!
//! Creation is one store write per name, in input order, with no batching
//! and no rollback: if a later step of the same request fails, rows
//! created here remain. Callers accept that orphan trade-off.

use std::sync::Arc;

use librarium_model::{AuthorId, PublisherId};
use tracing::debug;

use crate::database::ports::{AuthorStore, NewAuthor, NewPublisher, PublisherStore};
use crate::error::{CatalogError, Result};

/// ID-or-name input for one author-role relation.
///
/// Deliberately two plain fields rather than an enum: both may be
/// supplied, and non-empty `ids` silently win.
#[derive(Debug, Clone, Default)]
pub struct AuthorRefs {
    pub ids: Vec<AuthorId>,
    pub names: Vec<String>,
}

impl AuthorRefs {
    pub fn by_ids(ids: Vec<AuthorId>) -> Self {
        Self {
            ids,
            names: Vec::new(),
        }
    }

    pub fn by_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Vec::new(),
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

/// ID-or-name input for the publisher relation.
#[derive(Debug, Clone, Default)]
pub struct PublisherRef {
    pub id: Option<PublisherId>,
    pub name: Option<String>,
}

/// Resolves relation inputs against the author and publisher stores.
#[derive(Clone)]
pub struct RelationResolver {
    authors: Arc<dyn AuthorStore>,
    publishers: Arc<dyn PublisherStore>,
}

impl std::fmt::Debug for RelationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationResolver").finish_non_exhaustive()
    }
}

impl RelationResolver {
    pub fn new(authors: Arc<dyn AuthorStore>, publishers: Arc<dyn PublisherStore>) -> Self {
        Self { authors, publishers }
    }

    /// Resolves the authored-by role. At least one id or one name must be
    /// supplied; the result is never empty.
    pub async fn resolve_authors(&self, refs: &AuthorRefs) -> Result<Vec<AuthorId>> {
        if !refs.ids.is_empty() {
            // Keys are taken verbatim; the store's foreign-key write
            // validates their existence.
            return Ok(refs.ids.clone());
        }
        if refs.names.is_empty() {
            return Err(CatalogError::Validation(
                "at least one author id or author name is required".to_string(),
            ));
        }
        self.create_per_name(&refs.names).await
    }

    /// Resolves the translated-by role. Both inputs are optional and the
    /// result may be empty.
    pub async fn resolve_translators(&self, refs: &AuthorRefs) -> Result<Vec<AuthorId>> {
        if !refs.ids.is_empty() {
            return Ok(refs.ids.clone());
        }
        if refs.names.is_empty() {
            return Ok(Vec::new());
        }
        self.create_per_name(&refs.names).await
    }

    /// Resolves the publisher. A positive id wins; otherwise a non-blank
    /// name creates a new publisher row (name collisions surface as the
    /// store's uniqueness failure).
    pub async fn resolve_publisher(&self, publisher: &PublisherRef) -> Result<PublisherId> {
        if let Some(id) = publisher.id {
            if id.is_valid() {
                return Ok(id);
            }
        }
        match publisher.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                let created = self
                    .publishers
                    .create(&NewPublisher {
                        name: name.to_string(),
                    })
                    .await?;
                debug!("resolved publisher name \"{}\" to {}", name, created.pkid);
                Ok(created.pkid)
            }
            _ => Err(CatalogError::Validation(
                "a publisher id or publisher name is required".to_string(),
            )),
        }
    }

    async fn create_per_name(&self, names: &[String]) -> Result<Vec<AuthorId>> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim();
            if name.is_empty() {
                return Err(CatalogError::Validation(
                    "author name must not be blank".to_string(),
                ));
            }
            let created = self.authors.create(&NewAuthor::from_name(name)).await?;
            debug!("resolved author name \"{}\" to {}", name, created.pkid);
            ids.push(created.pkid);
        }
        Ok(ids)
    }
}
