use std::sync::Arc;

use librarium_model::{User, UserId};

use crate::database::ports::users::{NewUser, UserChanges, UserStore};
use crate::error::{CatalogError, Result};

/// Plain CRUD over registry users. No relations, no delete guards.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn create(&self, draft: NewUser) -> Result<User> {
        if draft.name.trim().is_empty() {
            return Err(CatalogError::Validation(
                "user name must not be blank".to_string(),
            ));
        }
        if draft.email.trim().is_empty() {
            return Err(CatalogError::Validation(
                "user email must not be blank".to_string(),
            ));
        }
        self.users.create(&draft).await
    }

    pub async fn find_by_pkid(&self, pkid: UserId) -> Result<Option<User>> {
        self.users.find_by_pkid(pkid).await
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        self.users.list().await
    }

    pub async fn update(&self, pkid: UserId, changes: UserChanges) -> Result<User> {
        if changes.is_empty() {
            return Err(CatalogError::Validation(
                "update contains no effective changes".to_string(),
            ));
        }
        self.users.update(pkid, &changes).await
    }

    pub async fn delete(&self, pkid: UserId) -> Result<()> {
        if !self.users.delete(pkid).await? {
            return Err(CatalogError::not_found("User", pkid));
        }
        Ok(())
    }
}
