//! Request bodies for the v1 API.
//!
//! Book writes accept relations by id, by bare name, or both; ids win.
//! The structs convert into the core's resolver inputs and commands.

use chrono::NaiveDate;
use serde::Deserialize;

use librarium_core::catalog::{AuthorRefs, CreateBookCommand, PublisherRef, UpdateBookCommand};
use librarium_core::database::ports::{
    AuthorChanges, NewAuthor, NewPublisher, NewUser, PublisherChanges, UserChanges,
};
use librarium_model::{AuthorId, Gender, PublisherId};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBookRequest {
    pub title: String,
    pub isbn: String,
    pub price: f64,
    pub edition: String,
    pub printing: String,
    pub image_url: String,
    #[serde(default)]
    pub remark: Option<String>,

    #[serde(default)]
    pub author_ids: Vec<AuthorId>,
    #[serde(default)]
    pub author_names: Vec<String>,
    #[serde(default)]
    pub translator_ids: Vec<AuthorId>,
    #[serde(default)]
    pub translator_names: Vec<String>,
    #[serde(default)]
    pub publisher_id: Option<PublisherId>,
    #[serde(default)]
    pub publisher_name: Option<String>,
}

impl CreateBookRequest {
    pub fn author_refs(&self) -> AuthorRefs {
        AuthorRefs {
            ids: self.author_ids.clone(),
            names: self.author_names.clone(),
        }
    }

    pub fn translator_refs(&self) -> AuthorRefs {
        AuthorRefs {
            ids: self.translator_ids.clone(),
            names: self.translator_names.clone(),
        }
    }

    pub fn publisher_ref(&self) -> PublisherRef {
        PublisherRef {
            id: self.publisher_id,
            name: self.publisher_name.clone(),
        }
    }

    pub fn into_command(
        self,
        author_ids: Vec<AuthorId>,
        translator_ids: Vec<AuthorId>,
        publisher_id: PublisherId,
    ) -> CreateBookCommand {
        CreateBookCommand {
            title: self.title,
            isbn: self.isbn,
            price: self.price,
            edition: self.edition,
            printing: self.printing,
            image_url: self.image_url,
            remark: self.remark,
            author_ids,
            translator_ids,
            publisher_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub price: Option<f64>,
    pub edition: Option<String>,
    pub printing: Option<String>,
    pub image_url: Option<String>,
    pub remark: Option<String>,

    pub author_ids: Option<Vec<AuthorId>>,
    pub author_names: Option<Vec<String>>,
    pub translator_ids: Option<Vec<AuthorId>>,
    pub translator_names: Option<Vec<String>>,
    pub publisher_id: Option<PublisherId>,
    pub publisher_name: Option<String>,
}

impl UpdateBookRequest {
    /// The authored-by inputs, when the request touches that relation.
    pub fn author_refs(&self) -> Option<AuthorRefs> {
        match (&self.author_ids, &self.author_names) {
            (None, None) => None,
            (ids, names) => Some(AuthorRefs {
                ids: ids.clone().unwrap_or_default(),
                names: names.clone().unwrap_or_default(),
            }),
        }
    }

    /// The translated-by inputs. `Some` with empty ids and names means an
    /// explicit clear (`"translatorIds": []` on the wire).
    pub fn translator_refs(&self) -> Option<AuthorRefs> {
        match (&self.translator_ids, &self.translator_names) {
            (None, None) => None,
            (ids, names) => Some(AuthorRefs {
                ids: ids.clone().unwrap_or_default(),
                names: names.clone().unwrap_or_default(),
            }),
        }
    }

    pub fn publisher_ref(&self) -> Option<PublisherRef> {
        if self.publisher_id.is_none() && self.publisher_name.is_none() {
            return None;
        }
        Some(PublisherRef {
            id: self.publisher_id,
            name: self.publisher_name.clone(),
        })
    }

    pub fn into_command(
        self,
        author_ids: Option<Vec<AuthorId>>,
        translator_ids: Option<Vec<AuthorId>>,
        publisher_id: Option<PublisherId>,
    ) -> UpdateBookCommand {
        UpdateBookCommand {
            title: self.title,
            isbn: self.isbn,
            price: self.price,
            edition: self.edition,
            printing: self.printing,
            image_url: self.image_url,
            remark: self.remark,
            author_ids,
            translator_ids,
            publisher_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateAuthorRequest {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub death_date: Option<NaiveDate>,
    #[serde(default)]
    pub introduction: Option<String>,
}

impl From<CreateAuthorRequest> for NewAuthor {
    fn from(request: CreateAuthorRequest) -> Self {
        NewAuthor {
            name: request.name,
            country: request.country,
            birth_date: request.birth_date,
            death_date: request.death_date,
            introduction: request.introduction,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateAuthorRequest {
    pub name: Option<String>,
    pub country: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub introduction: Option<String>,
}

impl From<UpdateAuthorRequest> for AuthorChanges {
    fn from(request: UpdateAuthorRequest) -> Self {
        AuthorChanges {
            name: request.name,
            country: request.country,
            birth_date: request.birth_date,
            death_date: request.death_date,
            introduction: request.introduction,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePublisherRequest {
    pub name: String,
}

impl From<CreatePublisherRequest> for NewPublisher {
    fn from(request: CreatePublisherRequest) -> Self {
        NewPublisher { name: request.name }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePublisherRequest {
    pub name: Option<String>,
}

impl From<UpdatePublisherRequest> for PublisherChanges {
    fn from(request: UpdatePublisherRequest) -> Self {
        PublisherChanges { name: request.name }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub birthdate: NaiveDate,
    pub gender: Gender,
    pub height: f64,
    pub status: bool,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        NewUser {
            name: request.name,
            email: request.email,
            birthdate: request.birthdate,
            gender: request.gender,
            height: request.height,
            status: request.status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub height: Option<f64>,
    pub status: Option<bool>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(request: UpdateUserRequest) -> Self {
        UserChanges {
            name: request.name,
            email: request.email,
            birthdate: request.birthdate,
            gender: request.gender,
            height: request.height,
            status: request.status,
        }
    }
}
