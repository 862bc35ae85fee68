//! Entity-store ports (interfaces), one per entity kind.
//!
//! These traits are the persistence contract the engine and the directory
//! services are written against. Implementations live under
//! `database::infrastructure` (PostgreSQL and in-memory adapters).

pub mod authors;
pub mod books;
pub mod publishers;
pub mod users;

pub use authors::{AuthorChanges, AuthorStore, NewAuthor};
pub use books::{BookChanges, BookStore, JoinSetChange, NewBook};
pub use publishers::{NewPublisher, PublisherChanges, PublisherStore};
pub use users::{NewUser, UserChanges, UserStore};
