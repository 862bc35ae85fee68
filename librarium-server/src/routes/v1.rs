use axum::{Router, routing::get};

use crate::handlers::{authors, books, publishers, users};
use crate::state::AppState;

/// Create all v1 API routes.
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        // Catalog
        .route(
            "/books",
            get(books::list_books_handler).post(books::create_book_handler),
        )
        .route(
            "/books/{id}",
            get(books::get_book_handler)
                .put(books::update_book_handler)
                .delete(books::delete_book_handler),
        )
        .route("/books/isbn/{isbn}", get(books::get_book_by_isbn_handler))
        // Author directory (also covers translators)
        .route(
            "/authors",
            get(authors::list_authors_handler).post(authors::create_author_handler),
        )
        .route(
            "/authors/{id}",
            get(authors::get_author_handler)
                .put(authors::update_author_handler)
                .delete(authors::delete_author_handler),
        )
        // Publisher directory
        .route(
            "/publishers",
            get(publishers::list_publishers_handler).post(publishers::create_publisher_handler),
        )
        .route(
            "/publishers/{id}",
            get(publishers::get_publisher_handler)
                .put(publishers::update_publisher_handler)
                .delete(publishers::delete_publisher_handler),
        )
        // User registry
        .route(
            "/users",
            get(users::list_users_handler).post(users::create_user_handler),
        )
        .route(
            "/users/{id}",
            get(users::get_user_handler)
                .put(users::update_user_handler)
                .delete(users::delete_user_handler),
        )
}
