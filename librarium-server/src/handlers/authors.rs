use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use librarium_model::{Author, AuthorId};

use crate::{
    dto::{CreateAuthorRequest, UpdateAuthorRequest},
    errors::{AppError, AppResult},
    state::AppState,
};

pub async fn list_authors_handler(State(state): State<AppState>) -> AppResult<Json<Vec<Author>>> {
    Ok(Json(state.authors.list().await?))
}

pub async fn get_author_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Author>> {
    let author = state
        .authors
        .find_by_pkid(AuthorId::new(id))
        .await?
        .ok_or_else(|| AppError::not_found("Author not found"))?;
    Ok(Json(author))
}

pub async fn create_author_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateAuthorRequest>,
) -> AppResult<(StatusCode, Json<Author>)> {
    let author = state.authors.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

pub async fn update_author_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateAuthorRequest>,
) -> AppResult<Json<Author>> {
    let author = state
        .authors
        .update(AuthorId::new(id), request.into())
        .await?;
    Ok(Json(author))
}

/// Delete an author. Blocked with 409 while any book references the
/// author, in either role.
pub async fn delete_author_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.authors.delete(AuthorId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
