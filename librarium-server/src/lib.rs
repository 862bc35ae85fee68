//! # Librarium Server
//!
//! HTTP layer for the Librarium catalog service.
//!
//! ## Overview
//!
//! A thin axum surface over `librarium-core`:
//!
//! - **Catalog**: book CRUD with ID-or-name relation resolution
//! - **Directories**: author and publisher CRUD with guarded deletes
//! - **Registry**: standalone user CRUD
//!
//! Error kinds map onto the HTTP contract: 404 for missing rows, 409 for
//! conflicts and blocked deletes, 400 for malformed relation input.

pub mod dto;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use errors::{AppError, AppResult};
pub use state::AppState;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Assemble the full application router over the given state.
pub fn build_app(state: AppState) -> Router {
    routes::create_api_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
