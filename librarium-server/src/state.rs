use std::sync::Arc;

use librarium_core::catalog::{CatalogService, RelationResolver};
use librarium_core::database::ports::{AuthorStore, BookStore, PublisherStore, UserStore};
use librarium_core::database::{
    MemoryStore, PostgresAuthorStore, PostgresBookStore, PostgresPublisherStore, PostgresStore,
    PostgresUserStore,
};
use librarium_core::directory::{AuthorDirectory, PublisherDirectory};
use librarium_core::registry::UserService;

/// Shared application state: the service layer, cloneable per request.
#[derive(Clone, Debug)]
pub struct AppState {
    pub catalog: CatalogService,
    pub authors: AuthorDirectory,
    pub publishers: PublisherDirectory,
    pub users: UserService,
    pub resolver: RelationResolver,
}

impl AppState {
    fn assemble(
        books: Arc<dyn BookStore>,
        authors: Arc<dyn AuthorStore>,
        publishers: Arc<dyn PublisherStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        let catalog = CatalogService::new(books);
        Self {
            authors: AuthorDirectory::new(authors.clone(), catalog.clone()),
            publishers: PublisherDirectory::new(publishers.clone(), catalog.clone()),
            users: UserService::new(users),
            resolver: RelationResolver::new(authors, publishers),
            catalog,
        }
    }

    pub fn from_postgres(store: &PostgresStore) -> Self {
        let pool = store.pool();
        Self::assemble(
            Arc::new(PostgresBookStore::new(pool.clone())),
            Arc::new(PostgresAuthorStore::new(pool.clone())),
            Arc::new(PostgresPublisherStore::new(pool.clone())),
            Arc::new(PostgresUserStore::new(pool.clone())),
        )
    }

    /// Everything on one in-memory store; used by the test-suite and the
    /// `--ephemeral` flag.
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::assemble(store.clone(), store.clone(), store.clone(), store)
    }
}
