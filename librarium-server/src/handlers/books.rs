use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use librarium_model::{Book, BookDetails, BookId, PublisherId};

use crate::{
    dto::{CreateBookRequest, UpdateBookRequest},
    errors::{AppError, AppResult},
    state::AppState,
};

pub async fn list_books_handler(State(state): State<AppState>) -> AppResult<Json<Vec<BookDetails>>> {
    Ok(Json(state.catalog.list().await?))
}

pub async fn get_book_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<BookDetails>> {
    let book = state
        .catalog
        .find_by_pkid(BookId::new(id))
        .await?
        .ok_or_else(|| AppError::not_found("Book not found"))?;
    Ok(Json(book))
}

pub async fn get_book_by_isbn_handler(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state
        .catalog
        .find_by_isbn(&isbn)
        .await?
        .ok_or_else(|| AppError::not_found("Book not found"))?;
    Ok(Json(book))
}

/// Create a book. Relation inputs go through the resolver first: ids are
/// taken verbatim, bare names create rows. Authors and publisher are
/// mandatory; the resolver rejects a request that supplies neither form.
pub async fn create_book_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateBookRequest>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let author_ids = state.resolver.resolve_authors(&request.author_refs()).await?;
    let translator_ids = state
        .resolver
        .resolve_translators(&request.translator_refs())
        .await?;
    let publisher_id = state
        .resolver
        .resolve_publisher(&request.publisher_ref())
        .await?;

    let book = state
        .catalog
        .create(request.into_command(author_ids, translator_ids, publisher_id))
        .await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book. Present relation inputs replace the whole join set;
/// `"translatorIds": []` clears translators. Present-but-empty author or
/// publisher inputs are dropped by the engine's sanitization rather than
/// rejected here.
pub async fn update_book_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBookRequest>,
) -> AppResult<Json<Book>> {
    let author_ids = match request.author_refs() {
        None => None,
        // An explicit empty replacement is not resolvable; hand it to the
        // engine, whose sanitization drops it (authors are mandatory).
        Some(refs) if refs.ids.is_empty() && refs.names.is_empty() => Some(Vec::new()),
        Some(refs) => Some(state.resolver.resolve_authors(&refs).await?),
    };
    let translator_ids = match request.translator_refs() {
        None => None,
        Some(refs) => Some(state.resolver.resolve_translators(&refs).await?),
    };
    let publisher_id = match request.publisher_ref() {
        None => None,
        Some(publisher) => {
            let resolvable = publisher.id.is_some_and(PublisherId::is_valid)
                || publisher
                    .name
                    .as_deref()
                    .is_some_and(|name| !name.trim().is_empty());
            if resolvable {
                Some(state.resolver.resolve_publisher(&publisher).await?)
            } else {
                None
            }
        }
    };

    let book = state
        .catalog
        .update(
            BookId::new(id),
            request.into_command(author_ids, translator_ids, publisher_id),
        )
        .await?;
    Ok(Json(book))
}

pub async fn delete_book_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.catalog.delete(BookId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
