pub mod authors;
pub mod books;
pub mod publishers;
pub mod users;

pub use authors::PostgresAuthorStore;
pub use books::PostgresBookStore;
pub use publishers::PostgresPublisherStore;
pub use users::PostgresUserStore;
