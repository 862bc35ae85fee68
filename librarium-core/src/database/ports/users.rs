use async_trait::async_trait;
use chrono::NaiveDate;
#[cfg(test)]
use mockall::automock;

use librarium_model::{Gender, User, UserId};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub birthdate: NaiveDate,
    pub gender: Gender,
    pub height: f64,
    pub status: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub status: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.birthdate.is_none()
            && self.gender.is_none()
            && self.height.is_none()
            && self.status.is_none()
    }
}

// Registry users have no relations, so this is plain row CRUD.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, draft: &NewUser) -> Result<User>;

    async fn find_by_pkid(&self, pkid: UserId) -> Result<Option<User>>;

    async fn list(&self) -> Result<Vec<User>>;

    /// Fails with `NotFound` when the user does not exist.
    async fn update(&self, pkid: UserId, changes: &UserChanges) -> Result<User>;

    /// Returns `false` when the user was already absent.
    async fn delete(&self, pkid: UserId) -> Result<bool>;
}
