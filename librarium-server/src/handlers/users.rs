use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use librarium_model::{User, UserId};

use crate::{
    dto::{CreateUserRequest, UpdateUserRequest},
    errors::{AppError, AppResult},
    state::AppState,
};

pub async fn list_users_handler(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.list().await?))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    let user = state
        .users
        .find_by_pkid(UserId::new(id))
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(user))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.users.create(request.into()).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> AppResult<Json<User>> {
    let user = state.users.update(UserId::new(id), request.into()).await?;
    Ok(Json(user))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.users.delete(UserId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
