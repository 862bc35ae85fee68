use thiserror::Error;

/// Error taxonomy shared by the catalog engine, the directories, and the
/// entity stores.
///
/// Store adapters translate constraint failures into these kinds; anything
/// they cannot classify propagates as `Internal`. A boolean return from a
/// store only ever means "not applicable" (e.g. delete of an absent row),
/// never that an error occurred.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} \"{value}\" already exists")]
    AlreadyExists { entity: &'static str, value: String },

    #[error("cannot delete {entity} {key}: {count} related entities")]
    RelatedEntity {
        entity: &'static str,
        key: i64,
        count: i64,
    },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        CatalogError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn already_exists(entity: &'static str, value: impl Into<String>) -> Self {
        CatalogError::AlreadyExists {
            entity,
            value: value.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }

    /// Unique-constraint violations, whether classified (`AlreadyExists`)
    /// or raw from the store layer (`Conflict`).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            CatalogError::AlreadyExists { .. } | CatalogError::Conflict(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
