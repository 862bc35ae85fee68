pub mod infrastructure;
pub mod ports;

pub use infrastructure::memory::MemoryStore;
pub use infrastructure::postgres::{
    PostgresAuthorStore, PostgresBookStore, PostgresPublisherStore, PostgresStore,
    PostgresUserStore,
};
