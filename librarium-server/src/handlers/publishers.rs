use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use librarium_model::{Publisher, PublisherId};

use crate::{
    dto::{CreatePublisherRequest, UpdatePublisherRequest},
    errors::{AppError, AppResult},
    state::AppState,
};

pub async fn list_publishers_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Publisher>>> {
    Ok(Json(state.publishers.list().await?))
}

pub async fn get_publisher_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Publisher>> {
    let publisher = state
        .publishers
        .find_by_pkid(PublisherId::new(id))
        .await?
        .ok_or_else(|| AppError::not_found("Publisher not found"))?;
    Ok(Json(publisher))
}

pub async fn create_publisher_handler(
    State(state): State<AppState>,
    Json(request): Json<CreatePublisherRequest>,
) -> AppResult<(StatusCode, Json<Publisher>)> {
    let publisher = state.publishers.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(publisher)))
}

pub async fn update_publisher_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePublisherRequest>,
) -> AppResult<Json<Publisher>> {
    let publisher = state
        .publishers
        .update(PublisherId::new(id), request.into())
        .await?;
    Ok(Json(publisher))
}

/// Delete a publisher. Blocked with 409 while any book references it.
pub async fn delete_publisher_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.publishers.delete(PublisherId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
