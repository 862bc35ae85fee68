//! The catalog bounded context: the book engine and the relation
//! resolver that feeds it.

pub mod resolver;
pub mod service;

pub use resolver::{AuthorRefs, PublisherRef, RelationResolver};
pub use service::{CatalogService, CreateBookCommand, UpdateBookCommand};
